//! Async runtime facade for the playback core.
//!
//! Core and provider crates depend on this crate instead of naming tokio
//! directly, so the executor can be swapped in one place.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Sleep, timeouts and instants
//! - `sync`: Channels, locks and cancellation
//! - `runtime`: Runtime handles and `block_on` for synchronous hosts
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_millis(150)).await;
//!         42
//!     });
//!     assert_eq!(handle.await.unwrap(), 42);
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, timeout, Duration, Instant};

/// Waits on several branches, running the first that completes.
pub use tokio::select;
