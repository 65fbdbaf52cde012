//! Synchronization primitives.
//!
//! Async-aware locks and channels from `tokio::sync`, plus the cooperative
//! cancellation token used to stop background pumps.
//!
//! Short critical sections over plain data use `parking_lot` in the calling
//! crates; the locks here are for state held across `.await` points.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{watch, Mutex};
//!
//! async fn example() {
//!     let transition = Mutex::new(());
//!     let _guard = transition.lock().await;
//!
//!     let (tx, rx) = watch::channel(0u32);
//!     tx.send_replace(1);
//!     assert_eq!(*rx.borrow(), 1);
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, OnceCell, RwLock, Semaphore,
};
pub use tokio_util::sync::CancellationToken;
