//! Picks the provider for a track the orchestrator reached through the
//! queue.

use crate::types::{ProviderKind, ProviderMap, Track};

/// Inputs to [`resolve_provider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Persisted user preference, if any.
    pub preferred: Option<ProviderKind>,
    /// The user has a usable streaming session.
    pub streaming_session_active: bool,
    /// Providers with a registered adapter.
    pub available: ProviderMap<bool>,
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self {
            preferred: None,
            streaming_session_active: false,
            available: ProviderMap {
                spotify: true,
                youtube: true,
            },
        }
    }
}

/// Chooses the provider for `track`.
///
/// Order: a preference that can play the track, then the streaming engine
/// when the user has a session with it, then the video engine. Returns
/// `None` when no available provider has an id for the track.
pub fn resolve_provider(track: &Track, context: &ResolutionContext) -> Option<ProviderKind> {
    let playable = |provider: ProviderKind| {
        context.available[provider] && track.available_on(provider)
    };

    if let Some(preferred) = context.preferred.filter(|p| playable(*p)) {
        return Some(preferred);
    }

    if context.streaming_session_active && playable(ProviderKind::Spotify) {
        return Some(ProviderKind::Spotify);
    }

    if playable(ProviderKind::YouTube) {
        return Some(ProviderKind::YouTube);
    }

    // Video is the default, but a streaming-only track is still playable
    // when the session state is unknown.
    playable(ProviderKind::Spotify).then_some(ProviderKind::Spotify)
}
