//! Runtime handles for hosts that drive the core from synchronous code.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Intended for synchronous host entry points (FFI shims, CLI smoke tools);
/// never call it from inside an async context.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

/// Returns the handle of the runtime the caller is running on, if any.
pub fn current() -> Option<Handle> {
    Handle::try_current().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_outside_runtime() {
        assert_eq!(block_on(async { "ok" }).unwrap(), "ok");
        assert!(current().is_none());
    }
}
