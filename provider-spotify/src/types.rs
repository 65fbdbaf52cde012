//! Connect Web API request and response bodies
//!
//! See: https://developer.spotify.com/documentation/web-api/reference/transfer-a-users-playback

use serde::{Deserialize, Serialize};

/// `PUT /me/player` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPlaybackBody {
    pub device_ids: Vec<String>,
    /// Keep the device paused; playback is started explicitly afterwards.
    pub play: bool,
}

/// `PUT /me/player/play` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPlaybackBody {
    pub uris: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_ms: Option<u64>,
}

/// Error envelope returned by the Web API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

/// Converts a bare track id to a `spotify:track:` URI. URIs pass through.
pub fn track_uri(track_id: &str) -> String {
    if track_id.starts_with("spotify:") {
        track_id.to_string()
    } else {
        format!("spotify:track:{}", track_id)
    }
}
