//! Task spawning.
//!
//! The playback core spawns short-lived background work (delayed unmute,
//! seek retries, fire-and-forget analytics) and long-lived pumps. Both go
//! through here.

pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current runtime.
///
/// # Panics
///
/// Panics when called outside a runtime context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Spawns a task whose result nobody awaits.
pub fn spawn_detached<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    drop(tokio::task::spawn(future));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::oneshot;

    #[tokio::test]
    async fn test_spawn_returns_output() {
        let handle = spawn(async { 2 + 2 });
        assert_eq!(handle.await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_spawn_detached_runs() {
        let (tx, rx) = oneshot::channel();
        spawn_detached(async move {
            let _ = tx.send("done");
        });
        assert_eq!(rx.await.unwrap(), "done");
    }
}
