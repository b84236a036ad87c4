//! Best-effort side effects.
//!
//! Non-critical work (featured recompute after an engagement event) is
//! spawned detached; a failure is logged and never awaited by the
//! caller's success path.

use quillpress_core::error::CoreResult;

/// Spawn a non-critical task. The primary operation's success does not
/// depend on it.
pub fn spawn_best_effort<T, F>(name: &'static str, fut: F)
where
    T: Send + 'static,
    F: Future<Output = CoreResult<T>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = fut.await {
            tracing::warn!(task = name, %error, "non-critical task failed");
        }
    });
}
