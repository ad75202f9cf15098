//! Blocking operation helpers for filesystem adapters.
//!
//! Offloads synchronous filesystem calls to tokio's blocking pool, avoiding
//! blocking the async executor.

/// Runs a blocking filesystem operation on the blocking thread pool.
///
/// A panicked or cancelled task is reported as an I/O error.
pub(super) async fn run_blocking<F, T, E>(f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<std::io::Error> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| E::from(std::io::Error::other(format!("task join error: {err}"))))?
}
