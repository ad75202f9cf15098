//! Advisory record locks backed by zero-byte marker files.
//!
//! A marker's existence means "held". Creation uses create-if-absent so two
//! writers cannot both succeed. Markers are cooperative: a writer that skips
//! them is only stopped by the version check. There is no expiry; a crashed
//! holder leaves a marker that an operator must remove.

use cap_std::fs::OpenOptions;
use cap_std::fs_utf8::Dir;
use std::io;

/// Attempts to create the marker. Returns `false` when it already exists.
pub(super) fn try_acquire(dir: &Dir, marker: &str) -> io::Result<bool> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    match dir.open_with(marker, &options) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(err) => Err(err),
    }
}

/// Removes the marker. A missing marker is not an error.
pub(super) fn release(dir: &Dir, marker: &str) -> io::Result<()> {
    match dir.remove_file(marker) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Returns whether the marker exists.
pub(super) fn is_held(dir: &Dir, marker: &str) -> io::Result<bool> {
    match dir.symlink_metadata(marker) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}
