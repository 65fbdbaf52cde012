//! Provider identity, per-provider maps and the track record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use std::time::Duration;

use crate::error::PlaybackError;

/// One of the two vendor playback backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Streaming-audio engine (Web Playback SDK).
    Spotify,
    /// Video engine (IFrame player).
    YouTube,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Spotify, ProviderKind::YouTube];

    /// The provider that is not `self`.
    pub fn other(self) -> Self {
        match self {
            ProviderKind::Spotify => ProviderKind::YouTube,
            ProviderKind::YouTube => ProviderKind::Spotify,
        }
    }

    /// Stable key used in settings, events and play records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Spotify => "spotify",
            ProviderKind::YouTube => "youtube",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotify" => Ok(ProviderKind::Spotify),
            "youtube" => Ok(ProviderKind::YouTube),
            other => Err(PlaybackError::UnknownProvider(other.to_string())),
        }
    }
}

/// A value per provider, indexable by [`ProviderKind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMap<T> {
    pub spotify: T,
    pub youtube: T,
}

impl<T> ProviderMap<T> {
    pub fn from_fn(mut f: impl FnMut(ProviderKind) -> T) -> Self {
        Self {
            spotify: f(ProviderKind::Spotify),
            youtube: f(ProviderKind::YouTube),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderKind, &T)> {
        [
            (ProviderKind::Spotify, &self.spotify),
            (ProviderKind::YouTube, &self.youtube),
        ]
        .into_iter()
    }
}

impl<T> Index<ProviderKind> for ProviderMap<T> {
    type Output = T;

    fn index(&self, kind: ProviderKind) -> &T {
        match kind {
            ProviderKind::Spotify => &self.spotify,
            ProviderKind::YouTube => &self.youtube,
        }
    }
}

impl<T> IndexMut<ProviderKind> for ProviderMap<T> {
    fn index_mut(&mut self, kind: ProviderKind) -> &mut T {
        match kind {
            ProviderKind::Spotify => &mut self.spotify,
            ProviderKind::YouTube => &mut self.youtube,
        }
    }
}

/// A track as supplied by search, feeds or recommendations.
///
/// The orchestrator only relies on the canonical id and the provider id of
/// the provider it is about to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Application-level identity.
    pub id: String,
    pub title: String,
    pub artist: String,
    /// Spotify track id (the `xxxx` of `spotify:track:xxxx`).
    pub spotify_id: Option<String>,
    /// YouTube video id.
    pub youtube_id: Option<String>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            spotify_id: None,
            youtube_id: None,
        }
    }

    pub fn with_spotify_id(mut self, id: impl Into<String>) -> Self {
        self.spotify_id = Some(id.into());
        self
    }

    pub fn with_youtube_id(mut self, id: impl Into<String>) -> Self {
        self.youtube_id = Some(id.into());
        self
    }

    pub fn provider_track_id(&self, provider: ProviderKind) -> Option<&str> {
        let id = match provider {
            ProviderKind::Spotify => self.spotify_id.as_deref(),
            ProviderKind::YouTube => self.youtube_id.as_deref(),
        };
        id.filter(|id| !id.is_empty())
    }

    pub fn available_on(&self, provider: ProviderKind) -> bool {
        self.provider_track_id(provider).is_some()
    }
}

/// Everything needed to put a track on a specific provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPlayerRequest {
    pub canonical_track_id: Option<String>,
    pub provider: ProviderKind,
    pub provider_track_id: String,
    pub start: Option<Duration>,
    /// Start playing as soon as the engine can.
    pub autoplay: bool,
    /// Where the request came from (`"queue"`, `"feed"`), forwarded to the
    /// play event recorder.
    pub context: Option<String>,
}

impl OpenPlayerRequest {
    pub fn new(provider: ProviderKind, provider_track_id: impl Into<String>) -> Self {
        Self {
            canonical_track_id: None,
            provider,
            provider_track_id: provider_track_id.into(),
            start: None,
            autoplay: true,
            context: None,
        }
    }

    pub fn for_track(mut self, canonical_track_id: impl Into<String>) -> Self {
        self.canonical_track_id = Some(canonical_track_id.into());
        self
    }

    pub fn starting_at(mut self, start: Duration) -> Self {
        self.start = Some(start);
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}
