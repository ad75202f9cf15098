//! Record file naming: `<id> - <human title>.md`.

use crate::task::domain::TaskId;

/// Extension of record files.
pub const RECORD_EXTENSION: &str = "md";

const TITLE_SEPARATOR: &str = " - ";

/// Returns whether `file_name` names a record file.
#[must_use]
pub fn is_record_file_name(file_name: &str) -> bool {
    stem(file_name).is_some_and(|name| !name.trim().is_empty())
}

/// Extracts the record id from a file name: the prefix before `" - "`, or
/// the whole stem when there is no title part.
#[must_use]
pub fn id_from_file_name(file_name: &str) -> Option<&str> {
    let name = stem(file_name)?;
    let prefix = name
        .split_once(TITLE_SEPARATOR)
        .map_or(name, |(prefix, _)| prefix)
        .trim();
    (!prefix.is_empty()).then_some(prefix)
}

/// Builds the canonical file name for a record.
///
/// Characters that cannot appear in a file name are dropped from the title.
#[must_use]
pub fn file_name_for(id: &TaskId, title: Option<&str>) -> String {
    let cleaned: String = title
        .unwrap_or_default()
        .chars()
        .filter(|ch| !matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|ch| !ch.is_control())
        .collect();
    let title_part = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if title_part.is_empty() {
        format!("{id}.{RECORD_EXTENSION}")
    } else {
        format!("{id}{TITLE_SEPARATOR}{title_part}.{RECORD_EXTENSION}")
    }
}

fn stem(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(RECORD_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
}
