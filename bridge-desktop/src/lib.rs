//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using a JSON file in the platform config directory
//!
//! Vendor engines (`StreamingEngine`, `VideoEngine`, `ScriptLoader`) have no
//! desktop default; they belong to whatever webview hosts the players.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FileSettingsStore, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let settings = FileSettingsStore::open_default().await?;
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod http;
mod settings;

pub use http::ReqwestHttpClient;
pub use settings::FileSettingsStore;
