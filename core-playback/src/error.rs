//! # Playback Error Types
//!
//! Engine-facing failures are logged and folded into state by the
//! orchestrator; only invariant violations travel back to callers.

use bridge_traits::BridgeError;
use thiserror::Error;

use crate::types::ProviderKind;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Engine Errors (transient)
    // ========================================================================
    /// Engine bridge is missing or could not service the call.
    #[error("Playback engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Vendor SDK could not be loaded.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// Native engine rejected a command.
    #[error("Engine rejected `{command}`: {message}")]
    EngineCommand { command: String, message: String },

    /// Vendor backend refused to transfer playback to our device.
    #[error("Device handoff failed: {0}")]
    HandoffFailed(String),

    /// Vendor backend refused to start the track.
    #[error("Playback did not start: {0}")]
    StartFailed(String),

    // ========================================================================
    // Configuration Conditions
    // ========================================================================
    /// No credentials for the provider; playback on it is disabled.
    #[error("No credentials available for {0}")]
    CredentialsUnavailable(ProviderKind),

    /// No adapter factory is registered for the provider.
    #[error("Provider {0} is not configured")]
    NotConfigured(ProviderKind),

    /// Provider key could not be parsed.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    // ========================================================================
    // Programmer Errors
    // ========================================================================
    /// The orchestration logic produced an impossible state.
    #[error("Playback invariant violated: {0}")]
    InvariantViolation(String),
}

impl PlaybackError {
    /// Returns `true` if trying again later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::EngineUnavailable(_)
                | PlaybackError::Bootstrap(_)
                | PlaybackError::EngineCommand { .. }
                | PlaybackError::HandoffFailed(_)
                | PlaybackError::StartFailed(_)
        )
    }

    /// Returns `true` for bugs in the orchestration logic itself.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, PlaybackError::InvariantViolation(_))
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::EngineRejected { command, message } => {
                PlaybackError::EngineCommand { command, message }
            }
            other => PlaybackError::EngineUnavailable(other.to_string()),
        }
    }
}

/// SDK loading failure, shared by every waiter of the same in-flight load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load {provider} SDK: {message}")]
pub struct BootstrapError {
    pub provider: ProviderKind,
    pub message: String,
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
