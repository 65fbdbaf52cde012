//! Error types for the YouTube provider

use bridge_traits::error::BridgeError;
use core_playback::PlaybackError;
use thiserror::Error;

/// YouTube provider errors
#[derive(Error, Debug)]
pub enum YouTubeError {
    /// Neither a bare video id nor a recognizable watch/share/embed URL
    #[error("Invalid YouTube video id: {0}")]
    InvalidVideoId(String),

    /// IFrame player bridge failure
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for YouTube operations
pub type Result<T> = std::result::Result<T, YouTubeError>;

impl From<YouTubeError> for PlaybackError {
    fn from(error: YouTubeError) -> Self {
        match error {
            YouTubeError::Bridge(e) => e.into(),
            YouTubeError::InvalidVideoId(id) => {
                PlaybackError::StartFailed(format!("invalid video id `{id}`"))
            }
        }
    }
}
