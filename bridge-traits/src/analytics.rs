//! Play event recording.
//!
//! Play history and analytics persistence are external collaborators. The
//! core notifies them fire-and-forget; a failing recorder never affects
//! playback.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What happened to the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayAction {
    /// Playback of a track was started.
    Play,
    /// The same track moved to the other provider.
    SwitchProvider,
}

impl PlayAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayAction::Play => "play",
            PlayAction::SwitchProvider => "switch_provider",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub canonical_track_id: String,
    /// Provider key, e.g. `"spotify"`.
    pub provider: String,
    pub action: PlayAction,
    /// Free-form origin (`"queue"`, `"feed"`, ...).
    pub context: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[async_trait]
pub trait PlayEventRecorder: Send + Sync {
    async fn record(&self, record: PlayRecord) -> Result<()>;
}

/// Recorder used when the host does not wire analytics.
#[derive(Debug, Clone, Default)]
pub struct NoopRecorder;

#[async_trait]
impl PlayEventRecorder for NoopRecorder {
    async fn record(&self, _record: PlayRecord) -> Result<()> {
        Ok(())
    }
}
