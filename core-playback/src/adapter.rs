//! # Provider Adapter Contract
//!
//! Uniform command surface every vendor engine is driven through, and the
//! notification channel adapters use to report back.
//!
//! Adapters never touch [`PlaybackState`](crate::state::PlaybackState).
//! They translate engine callbacks into [`AdapterNotification`]s and the
//! orchestrator decides what each one means for shared state.

use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::EngineSignal;
use core_async::sync::mpsc;
use core_runtime::config::{EngineTimings, FeatureFlags};
use core_runtime::events::{CoreEvent, EngineEvent, EventBus};

use crate::error::{PlaybackError, Result};
use crate::lifecycle::EngineLifecycle;
use crate::types::ProviderKind;

/// Load a track on an adapter, optionally starting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueRequest {
    pub provider_track_id: String,
    pub autoplay: bool,
    pub start: Option<Duration>,
}

/// Whether a command reached the engine or was parked until it reports
/// ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Buffered,
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        self == Delivery::Delivered
    }
}

/// Operations a playback engine exposes to the orchestrator.
///
/// Every command must be safe to call before the engine reports ready;
/// implementations buffer the latest `play`/`seek_to` and replay it once.
/// Errors are returned for logging only; the orchestrator never surfaces
/// them to its callers.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderKind;

    fn lifecycle(&self) -> EngineLifecycle;

    /// `false` once the adapter has learned it cannot play for this session
    /// (for example, no credentials).
    fn has_session(&self) -> bool {
        true
    }

    /// Confirms the adapter can play right now, acquiring credentials if it
    /// needs them. Runs before the previous provider is retired.
    async fn ensure_session(&self) -> Result<()> {
        if self.has_session() {
            Ok(())
        } else {
            Err(PlaybackError::CredentialsUnavailable(self.provider()))
        }
    }

    /// Whether the user currently has a usable session, without disabling
    /// anything when they do not.
    async fn session_active(&self) -> bool {
        self.has_session()
    }

    /// Load `provider_track_id`, reusing the live native player if any.
    /// Reports whether the requested start offset reached the engine.
    async fn cue(&self, request: CueRequest) -> Result<Delivery>;

    async fn play(&self, start: Option<Duration>) -> Result<()>;

    /// Idempotent.
    async fn pause(&self) -> Result<()>;

    async fn seek_to(&self, position: Duration) -> Result<Delivery>;

    /// Best effort, `level` in 0.0..=1.0.
    async fn set_volume(&self, level: f32) -> Result<()>;

    /// Best effort.
    async fn set_mute(&self, muted: bool) -> Result<()>;

    /// Release engine resources. Safe to call repeatedly; never fails.
    async fn teardown(&self);

    /// Route a native engine callback into the adapter.
    async fn handle_signal(&self, signal: EngineSignal);
}

/// What an adapter observed.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationKind {
    Ready,
    PositionChanged {
        position: Duration,
        duration: Option<Duration>,
    },
    PlayingChanged(bool),
    Ended,
    Failed {
        message: String,
        recoverable: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdapterNotification {
    pub provider: ProviderKind,
    pub kind: NotificationKind,
}

pub type NotificationSender = mpsc::UnboundedSender<AdapterNotification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<AdapterNotification>;

/// Provider-stamped handle onto the orchestrator's notification channel.
#[derive(Debug, Clone)]
pub struct AdapterNotifier {
    provider: ProviderKind,
    sender: NotificationSender,
}

impl AdapterNotifier {
    pub fn new(provider: ProviderKind, sender: NotificationSender) -> Self {
        Self { provider, sender }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn notify(&self, kind: NotificationKind) {
        // The orchestrator dropping its receiver means the session ended.
        let _ = self.sender.send(AdapterNotification {
            provider: self.provider,
            kind,
        });
    }

    pub fn ready(&self) {
        self.notify(NotificationKind::Ready);
    }

    pub fn position(&self, position: Duration, duration: Option<Duration>) {
        self.notify(NotificationKind::PositionChanged { position, duration });
    }

    pub fn playing(&self, playing: bool) {
        self.notify(NotificationKind::PlayingChanged(playing));
    }

    pub fn ended(&self) {
        self.notify(NotificationKind::Ended);
    }

    pub fn failed(&self, message: impl Into<String>, recoverable: bool) {
        self.notify(NotificationKind::Failed {
            message: message.into(),
            recoverable,
        });
    }
}

/// Everything an adapter factory receives.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    pub notifier: AdapterNotifier,
    pub events: EventBus,
    pub timings: EngineTimings,
    pub features: FeatureFlags,
}

impl AdapterContext {
    pub fn provider(&self) -> ProviderKind {
        self.notifier.provider()
    }

    /// Publish an engine lifecycle event stamped with this provider.
    pub fn engine_event(&self, make: impl FnOnce(String) -> EngineEvent) {
        let event = make(self.provider().as_str().to_string());
        self.events.publish(CoreEvent::Engine(event));
    }
}
