//! Error types for the Spotify provider

use bridge_traits::error::BridgeError;
use core_playback::{PlaybackError, ProviderKind};
use thiserror::Error;

/// Spotify provider errors
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// The token provider had no token for the user
    #[error("No Spotify access token for this session")]
    MissingToken,

    /// Connect Web API returned a non-success status
    #[error("Spotify API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// The SDK has not reported a device id yet
    #[error("Spotify device not ready")]
    NoDevice,

    /// Transport failure or SDK bridge failure
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl SpotifyError {
    /// Throttling, server errors and transport failures may succeed on a
    /// second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            SpotifyError::ApiError { status_code, .. } => {
                *status_code == 429 || (500..600).contains(status_code)
            }
            SpotifyError::Bridge(BridgeError::OperationFailed(_))
            | SpotifyError::Bridge(BridgeError::Io(_)) => true,
            _ => false,
        }
    }
}

/// Result type for Spotify operations
pub type Result<T> = std::result::Result<T, SpotifyError>;

impl From<SpotifyError> for PlaybackError {
    fn from(error: SpotifyError) -> Self {
        match error {
            SpotifyError::MissingToken => PlaybackError::CredentialsUnavailable(ProviderKind::Spotify),
            SpotifyError::Bridge(e) => e.into(),
            other => PlaybackError::EngineUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        let throttled = SpotifyError::ApiError {
            status_code: 429,
            message: "API rate limit exceeded".to_string(),
        };
        let forbidden = SpotifyError::ApiError {
            status_code: 403,
            message: "Player command failed: Premium required".to_string(),
        };

        assert!(throttled.is_retryable());
        assert!(!forbidden.is_retryable());
        assert!(SpotifyError::Bridge(BridgeError::OperationFailed("reset".into())).is_retryable());
        assert!(!SpotifyError::NoDevice.is_retryable());
    }

    #[test]
    fn test_missing_token_maps_to_credentials_unavailable() {
        let error: PlaybackError = SpotifyError::MissingToken.into();
        assert!(matches!(
            error,
            PlaybackError::CredentialsUnavailable(ProviderKind::Spotify)
        ));
    }
}
