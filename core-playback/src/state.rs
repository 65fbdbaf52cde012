//! # Playback State
//!
//! The single source of truth for what is playing. Only the orchestrator
//! mutates it, and only through [`StateStore::update`], which checks the
//! invariants on every change before the new state becomes visible.

use std::time::Duration;

use core_async::sync::watch;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{PlaybackError, Result};
use crate::queue::QueueManager;
use crate::types::{ProviderKind, ProviderMap};

/// Coarse orchestrator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    Idle,
    Active(ProviderKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub active_provider: Option<ProviderKind>,
    pub canonical_track_id: Option<String>,
    pub provider_track_ids: ProviderMap<Option<String>>,
    /// Mount flags. At most one is set.
    pub open: ProviderMap<bool>,
    pub autoplay_requested: ProviderMap<bool>,
    /// Seek not yet handed to the active engine.
    pub pending_seek: Option<Duration>,
    pub is_playing: bool,
    pub current_section_id: Option<String>,
    pub queue: QueueManager,
    /// Last engine-reported position.
    pub position: Duration,
    pub duration: Option<Duration>,
    /// 0.0..=1.0
    pub volume: f32,
    pub muted: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            active_provider: None,
            canonical_track_id: None,
            provider_track_ids: ProviderMap::default(),
            open: ProviderMap::default(),
            autoplay_requested: ProviderMap::default(),
            pending_seek: None,
            is_playing: false,
            current_section_id: None,
            queue: QueueManager::new(),
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
            muted: false,
        }
    }
}

impl PlaybackState {
    pub fn phase(&self) -> PlaybackPhase {
        match self.active_provider {
            Some(provider) => PlaybackPhase::Active(provider),
            None => PlaybackPhase::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active_provider.is_none()
    }

    /// Provider track id for the active provider.
    pub fn active_track_id(&self) -> Option<&str> {
        self.active_provider
            .and_then(|provider| self.provider_track_ids[provider].as_deref())
    }

    /// Returns the first broken invariant, if any.
    pub fn check_invariants(&self) -> Result<()> {
        if self.open.spotify && self.open.youtube {
            return Err(violation("both providers are open"));
        }

        match self.active_provider {
            Some(active) => {
                if self.open[active.other()] {
                    return Err(violation(format!(
                        "{} is active but {} is open",
                        active,
                        active.other()
                    )));
                }
            }
            None => {
                if let Some((provider, _)) = self.open.iter().find(|(_, open)| **open) {
                    return Err(violation(format!("{} is open while idle", provider)));
                }
            }
        }

        match self.queue.index() {
            None if !self.queue.is_empty() => {
                return Err(violation("queue has tracks but no cursor"));
            }
            Some(index) if index >= self.queue.len() => {
                return Err(violation(format!(
                    "queue cursor {} outside queue of {}",
                    index,
                    self.queue.len()
                )));
            }
            _ => {}
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err(violation(format!("volume {} outside 0..=1", self.volume)));
        }

        Ok(())
    }
}

fn violation(message: impl Into<String>) -> PlaybackError {
    PlaybackError::InvariantViolation(message.into())
}

/// Invariant-checked, observable container for [`PlaybackState`].
#[derive(Debug)]
pub struct StateStore {
    current: Mutex<PlaybackState>,
    publisher: watch::Sender<PlaybackState>,
}

impl StateStore {
    pub fn new() -> Self {
        let initial = PlaybackState::default();
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            current: Mutex::new(initial),
            publisher,
        }
    }

    pub fn snapshot(&self) -> PlaybackState {
        self.current.lock().clone()
    }

    /// Read a value without cloning the whole state.
    pub fn read<R>(&self, f: impl FnOnce(&PlaybackState) -> R) -> R {
        f(&self.current.lock())
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.publisher.subscribe()
    }

    /// Applies `mutate` to a draft and commits it only if every invariant
    /// still holds. A violation leaves the committed state untouched.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut PlaybackState) -> R) -> Result<R> {
        let mut current = self.current.lock();
        let mut draft = current.clone();
        let output = mutate(&mut draft);

        if let Err(e) = draft.check_invariants() {
            error!(error = %e, "Rejected playback state update");
            return Err(e);
        }

        if draft != *current {
            *current = draft.clone();
            self.publisher.send_replace(draft);
        }
        Ok(output)
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
