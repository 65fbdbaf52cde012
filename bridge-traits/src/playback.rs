//! Vendor playback engine surfaces.
//!
//! The streaming SDK and the video iframe player are owned by the host (a
//! webview, an embedded browser, a native SDK wrapper). These traits are the
//! narrow command surface the provider adapters drive; the host routes the
//! engines' callbacks back in as [`EngineSignal`]s.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Result;

/// External script (or native SDK bundle) that must be loaded once per
/// process before an engine can be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptSource {
    pub url: String,
    /// Global callback the SDK invokes once it has finished initializing.
    pub ready_callback: String,
}

impl ScriptSource {
    pub fn new(url: impl Into<String>, ready_callback: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ready_callback: ready_callback.into(),
        }
    }

    /// Spotify Web Playback SDK.
    pub fn spotify_web_playback() -> Self {
        Self::new(
            "https://sdk.scdn.co/spotify-player.js",
            "onSpotifyWebPlaybackSDKReady",
        )
    }

    /// YouTube IFrame Player API.
    pub fn youtube_iframe_api() -> Self {
        Self::new(
            "https://www.youtube.com/iframe_api",
            "onYouTubeIframeAPIReady",
        )
    }
}

/// Injects an SDK script and resolves once its ready callback fired.
///
/// Implementations are not required to deduplicate concurrent calls; the
/// core memoizes in-flight loads itself.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    async fn load(&self, source: &ScriptSource) -> Result<()>;
}

/// Options for connecting the streaming engine's local player.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingConnectOptions {
    /// Device name shown in the vendor's device picker.
    pub player_name: String,
    pub access_token: String,
    /// Initial volume, 0.0..=1.0.
    pub volume: f32,
}

/// Streaming-audio engine (Spotify Web Playback SDK style).
///
/// Tracks are not loaded through the engine itself: the vendor backend is
/// told to start playback on the engine's device id, which the host reports
/// through [`EngineSignal::Ready`].
#[async_trait]
pub trait StreamingEngine: Send + Sync {
    /// Create the local player and connect it to the vendor backend.
    async fn connect(&self, options: StreamingConnectOptions) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    async fn seek(&self, position: Duration) -> Result<()>;

    /// Set volume in the 0.0..=1.0 range.
    async fn set_volume(&self, level: f32) -> Result<()>;

    /// Disconnect and release the local player.
    async fn disconnect(&self) -> Result<()>;
}

/// Options used when the video player element is first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPlayerOptions {
    pub video_id: String,
    pub autoplay: bool,
    pub muted: bool,
    pub start: Option<Duration>,
}

/// Video engine (YouTube IFrame player style).
#[async_trait]
pub trait VideoEngine: Send + Sync {
    /// Create the native player element with an initial video.
    async fn create_player(&self, options: VideoPlayerOptions) -> Result<()>;

    /// Load and start a video on the existing player.
    async fn load_video(&self, video_id: &str, start: Option<Duration>) -> Result<()>;

    /// Load a video on the existing player without starting it.
    async fn cue_video(&self, video_id: &str, start: Option<Duration>) -> Result<()>;

    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn seek_to(&self, position: Duration) -> Result<()>;

    /// Set volume as a percentage, 0..=100.
    async fn set_volume(&self, percent: u8) -> Result<()>;

    async fn mute(&self) -> Result<()>;

    async fn unmute(&self) -> Result<()>;

    /// Destroy the player and remove its host element.
    async fn destroy(&self) -> Result<()>;
}

/// Transport snapshot reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
}

/// Callbacks raised by a vendor engine, routed by the host to the adapter
/// that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineSignal {
    /// Engine finished initializing. Streaming engines report their device id.
    Ready { device_id: Option<String> },
    /// Engine lost its backend session (device went offline).
    NotReady,
    /// Full transport snapshot (streaming SDK `player_state_changed`).
    StateChanged(EngineStatus),
    /// Raw video player state code (`onStateChange`).
    VideoStateChanged { code: i32 },
    /// Periodic position report.
    Progress {
        position: Duration,
        duration: Option<Duration>,
    },
    /// Current track reached its end.
    Ended,
    Error { message: String },
}

impl EngineSignal {
    pub fn name(&self) -> &'static str {
        match self {
            EngineSignal::Ready { .. } => "ready",
            EngineSignal::NotReady => "not_ready",
            EngineSignal::StateChanged(_) => "state_changed",
            EngineSignal::VideoStateChanged { .. } => "video_state_changed",
            EngineSignal::Progress { .. } => "progress",
            EngineSignal::Ended => "ended",
            EngineSignal::Error { .. } => "error",
        }
    }
}
