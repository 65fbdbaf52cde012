//! # Host Bridge Traits
//!
//! Contracts the host application implements for the playback core.
//!
//! ## Overview
//!
//! The core never talks to a vendor SDK, the network or the disk directly.
//! Each capability it needs is a trait here; hosts ship concrete adapters
//! (`bridge-desktop` provides the desktop defaults).
//!
//! ## Traits
//!
//! ### Vendor engines
//! - [`ScriptLoader`](playback::ScriptLoader) - Injects an SDK script once and waits for its ready callback
//! - [`StreamingEngine`](playback::StreamingEngine) - Streaming-audio player (Spotify Web Playback SDK)
//! - [`VideoEngine`](playback::VideoEngine) - Video player (YouTube IFrame API)
//!
//! ### Networking & Storage
//! - [`HttpClient`](http::HttpClient) - Vendor control-plane requests
//! - [`SettingsStore`](storage::SettingsStore) - Persisted preferences (preferred provider)
//!
//! ### External collaborators
//! - [`AccessTokenProvider`](auth::AccessTokenProvider) - Streaming provider tokens
//! - [`PlayEventRecorder`](analytics::PlayEventRecorder) - Fire-and-forget play history
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Engine bridges
//! report native call failures as [`BridgeError::EngineRejected`].
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so they can be shared across async
//! tasks behind `Arc<dyn Trait>`.

pub mod analytics;
pub mod auth;
pub mod error;
pub mod http;
pub mod playback;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use analytics::{NoopRecorder, PlayAction, PlayEventRecorder, PlayRecord};
pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use playback::{
    EngineSignal, EngineStatus, ScriptLoader, ScriptSource, StreamingConnectOptions,
    StreamingEngine, VideoEngine, VideoPlayerOptions,
};
pub use storage::SettingsStore;
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, SystemClock};
