//! # Playback Orchestrator
//!
//! Owns [`PlaybackState`], chooses and activates provider adapters, and
//! presents one transport over two vendor engines.
//!
//! ## Provider switches
//!
//! Switches are serialized by an async transition lock. The previous
//! provider is paused and torn down (bounded by
//! `EngineTimings::teardown_timeout`) before the new provider is marked
//! active, so two engines never play at the same time.
//!
//! ## Failure policy
//!
//! Engine and network failures are logged and reported as
//! `PlaybackEvent::Error`; they never cross this boundary. Missing
//! credentials disable the provider silently. Only invariant violations
//! are returned as errors.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{Clock, PlayAction, PlayEventRecorder, PlayRecord, SettingsStore};
use core_async::sync::{mpsc, watch, CancellationToken, Mutex};
use core_async::task::spawn_detached;
use core_async::time::within;
use core_runtime::config::{
    CoreConfig, EngineTimings, FeatureFlags, DEFAULT_EVENT_BUFFER_SIZE,
    DEFAULT_PREFERRED_PROVIDER_KEY,
};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use tracing::{debug, error, info, instrument, warn};

use crate::adapter::{
    AdapterNotification, CueRequest, Delivery, NotificationKind, NotificationReceiver,
    ProviderAdapter,
};
use crate::error::{PlaybackError, Result};
use crate::queue::QueueManager;
use crate::registry::{AdapterFactory, AdapterRegistry};
use crate::resolution::{resolve_provider, ResolutionContext};
use crate::state::{PlaybackState, StateStore};
use crate::types::{OpenPlayerRequest, ProviderKind, ProviderMap, Track};

/// Collaborators and tunables for [`PlaybackOrchestrator`].
#[derive(Clone)]
pub struct OrchestratorConfig {
    pub settings: Arc<dyn SettingsStore>,
    pub recorder: Arc<dyn PlayEventRecorder>,
    pub clock: Arc<dyn Clock>,
    pub timings: EngineTimings,
    pub features: FeatureFlags,
    /// Settings key holding the preferred provider (`"spotify"`/`"youtube"`).
    pub preferred_provider_key: String,
    pub event_buffer_size: usize,
}

impl OrchestratorConfig {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        recorder: Arc<dyn PlayEventRecorder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            recorder,
            clock,
            timings: EngineTimings::default(),
            features: FeatureFlags::default(),
            preferred_provider_key: DEFAULT_PREFERRED_PROVIDER_KEY.to_string(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }

    pub fn from_core(config: &CoreConfig) -> Self {
        Self {
            settings: Arc::clone(&config.settings_store),
            recorder: Arc::clone(&config.event_recorder),
            clock: Arc::clone(&config.clock),
            timings: config.timings,
            features: config.features,
            preferred_provider_key: config.preferred_provider_key.clone(),
            event_buffer_size: config.event_buffer_size,
        }
    }

    pub fn with_timings(mut self, timings: EngineTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }
}

/// Registers adapter factories and builds the orchestrator.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    factories: Vec<(ProviderKind, AdapterFactory)>,
}

impl OrchestratorBuilder {
    pub fn adapter_factory(mut self, provider: ProviderKind, factory: AdapterFactory) -> Self {
        self.factories.push((provider, factory));
        self
    }

    /// Returns the orchestrator and the receiving end of the adapter
    /// notification channel, to be driven by
    /// [`PlaybackOrchestrator::run_notifications`].
    pub fn build(self) -> (PlaybackOrchestrator, NotificationReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let events = EventBus::new(self.config.event_buffer_size.max(1));
        let mut registry = AdapterRegistry::new(
            sender,
            events.clone(),
            self.config.timings,
            self.config.features,
        );
        for (provider, factory) in self.factories {
            registry.register(provider, factory);
        }

        let orchestrator = PlaybackOrchestrator {
            state: StateStore::new(),
            registry,
            transition: Mutex::new(()),
            events,
            config: self.config,
        };
        (orchestrator, receiver)
    }
}

pub struct PlaybackOrchestrator {
    state: StateStore,
    registry: AdapterRegistry,
    /// Serializes provider activation, stop and shutdown.
    transition: Mutex<()>,
    events: EventBus,
    config: OrchestratorConfig,
}

impl PlaybackOrchestrator {
    pub fn builder(config: OrchestratorConfig) -> OrchestratorBuilder {
        OrchestratorBuilder {
            config,
            factories: Vec::new(),
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn snapshot(&self) -> PlaybackState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Adapter for `provider`, created on first use.
    pub fn adapter(&self, provider: ProviderKind) -> Result<Arc<dyn ProviderAdapter>> {
        self.registry.get_or_create(provider)
    }

    // ========================================================================
    // Activation
    // ========================================================================

    /// Play `provider_track_id` on `provider` from `start`.
    #[instrument(skip(self))]
    pub async fn play(
        &self,
        canonical_track_id: Option<String>,
        provider: ProviderKind,
        provider_track_id: &str,
        start: Option<Duration>,
    ) -> Result<()> {
        let request = OpenPlayerRequest {
            canonical_track_id,
            provider,
            provider_track_id: provider_track_id.to_string(),
            start,
            autoplay: true,
            context: None,
        };
        self.activate(request, PlayAction::Play).await
    }

    /// Same as [`play`](Self::play) for callers that already hold a full
    /// request, including the autoplay flag.
    pub async fn open_player(&self, request: OpenPlayerRequest) -> Result<()> {
        self.activate(request, PlayAction::Play).await
    }

    /// Move the current logical track to another provider, continuing from
    /// the current position. The queue is not touched.
    #[instrument(skip(self))]
    pub async fn switch_provider(
        &self,
        provider: ProviderKind,
        provider_track_id: &str,
        canonical_track_id: Option<String>,
    ) -> Result<()> {
        let (current_track, position, playing) = self.state.read(|s| {
            (
                s.canonical_track_id.clone(),
                s.position,
                s.is_playing || s.is_idle(),
            )
        });
        let request = OpenPlayerRequest {
            canonical_track_id: canonical_track_id.or(current_track),
            provider,
            provider_track_id: provider_track_id.to_string(),
            start: (!position.is_zero()).then_some(position),
            autoplay: playing,
            context: None,
        };
        self.activate(request, PlayAction::SwitchProvider).await
    }

    async fn activate(&self, request: OpenPlayerRequest, action: PlayAction) -> Result<()> {
        let _transition = self.transition.lock().await;
        let provider = request.provider;

        if request.provider_track_id.trim().is_empty() {
            warn!(provider = %provider, "Ignoring play request without a provider track id");
            return Ok(());
        }

        let adapter = match self.registry.get_or_create(provider) {
            Ok(adapter) => adapter,
            Err(e) => {
                warn!(provider = %provider, error = %e, "Provider unavailable");
                self.publish_error(request.canonical_track_id.clone(), Some(provider), &e);
                return Ok(());
            }
        };

        // Checked before retiring the previous provider so a refused start
        // leaves the current session playing.
        if let Err(e) = adapter.ensure_session().await {
            return self.activation_refused(provider, request.canonical_track_id.clone(), e);
        }

        let previous = self.state.read(|s| s.active_provider);
        if let Some(previous) = previous.filter(|p| *p != provider) {
            self.retire(previous).await;
        }

        let track_id = request.canonical_track_id.clone();
        self.state.update(|s| {
            let other = provider.other();
            s.active_provider = Some(provider);
            s.canonical_track_id = track_id.clone();
            s.provider_track_ids[provider] = Some(request.provider_track_id.clone());
            s.provider_track_ids[other] = None;
            s.open[provider] = true;
            s.open[other] = false;
            s.autoplay_requested[provider] = request.autoplay;
            s.autoplay_requested[other] = false;
            s.pending_seek = request.start;
            s.is_playing = request.autoplay;
            s.position = request.start.unwrap_or_default();
            s.duration = None;
            s.current_section_id = None;
        })?;

        if previous != Some(provider) {
            self.publish(PlaybackEvent::ProviderSwitched {
                from: previous.map(|p| p.as_str().to_string()),
                to: provider.as_str().to_string(),
                track_id: track_id.clone(),
            });
        }
        self.publish(PlaybackEvent::Started {
            track_id: track_id.clone(),
            provider: provider.as_str().to_string(),
            provider_track_id: request.provider_track_id.clone(),
            start_ms: request.start.map(|d| d.as_millis() as u64),
        });
        self.record_play(&request, action);

        info!(
            provider = %provider,
            track_id = ?track_id,
            autoplay = request.autoplay,
            "Activating provider"
        );

        let cue = CueRequest {
            provider_track_id: request.provider_track_id.clone(),
            autoplay: request.autoplay,
            start: request.start,
        };
        match adapter.cue(cue).await {
            Ok(Delivery::Delivered) if request.start.is_some() => {
                self.clear_pending_seek(provider, request.start)
            }
            Ok(_) => Ok(()),
            Err(e) => self.playback_failed(provider, track_id, e),
        }
    }

    /// Pause and tear down `provider`, waiting at most `teardown_timeout`.
    async fn retire(&self, provider: ProviderKind) {
        let Some(adapter) = self.registry.get(provider) else {
            return;
        };

        debug!(provider = %provider, "Retiring previous provider");
        let retired = within(self.config.timings.teardown_timeout, async {
            if let Err(e) = adapter.pause().await {
                warn!(provider = %provider, error = %e, "Pause before teardown failed");
            }
            adapter.teardown().await;
        })
        .await;

        if retired.is_none() {
            warn!(
                provider = %provider,
                timeout_ms = self.config.timings.teardown_timeout.as_millis() as u64,
                "Teardown timed out, continuing"
            );
        }
    }

    fn record_play(&self, request: &OpenPlayerRequest, action: PlayAction) {
        let Some(canonical_track_id) = request.canonical_track_id.clone() else {
            return;
        };
        let record = PlayRecord {
            canonical_track_id,
            provider: request.provider.as_str().to_string(),
            action,
            context: request.context.clone(),
            occurred_at: self.config.clock.now(),
        };
        let recorder = Arc::clone(&self.config.recorder);
        spawn_detached(async move {
            if let Err(e) = recorder.record(record).await {
                warn!(error = %e, "Failed to record play event");
            }
        });
    }

    /// The adapter refused to start before anything was retired.
    fn activation_refused(
        &self,
        provider: ProviderKind,
        track_id: Option<String>,
        error: PlaybackError,
    ) -> Result<()> {
        match error {
            PlaybackError::CredentialsUnavailable(_) => {
                debug!(provider = %provider, "Provider has no session, skipping play");
                Ok(())
            }
            e if e.is_invariant_violation() => Err(e),
            e => {
                warn!(provider = %provider, error = %e, "Provider cannot start");
                self.publish_error(track_id, Some(provider), &e);
                Ok(())
            }
        }
    }

    fn playback_failed(
        &self,
        provider: ProviderKind,
        track_id: Option<String>,
        error: PlaybackError,
    ) -> Result<()> {
        if error.is_invariant_violation() {
            return Err(error);
        }

        if let PlaybackError::CredentialsUnavailable(_) = error {
            // The player never appears: close it instead of leaving it open
            // and silent.
            self.state.update(|s| {
                if s.active_provider == Some(provider) {
                    reset_transport(s);
                }
            })?;
            debug!(provider = %provider, "Playback skipped, no credentials");
            return Ok(());
        }

        self.state.update(|s| {
            if s.active_provider == Some(provider) {
                s.is_playing = false;
                s.autoplay_requested[provider] = false;
            }
        })?;

        warn!(provider = %provider, error = %error, "Playback did not start");
        self.publish_error(track_id, Some(provider), &error);
        Ok(())
    }

    fn clear_pending_seek(&self, provider: ProviderKind, delivered: Option<Duration>) -> Result<()> {
        self.state.update(|s| {
            if s.active_provider == Some(provider) && s.pending_seek == delivered {
                s.pending_seek = None;
            }
        })
    }

    // ========================================================================
    // Transport
    // ========================================================================

    pub async fn pause(&self) -> Result<()> {
        if let Some(adapter) = self.active_adapter() {
            if let Err(e) = adapter.pause().await {
                warn!(provider = %adapter.provider(), error = %e, "Pause failed");
            }
        }

        let track_id = self.state.update(|s| {
            s.is_playing = false;
            s.autoplay_requested = ProviderMap::default();
            s.canonical_track_id.clone()
        })?;
        self.publish(PlaybackEvent::Paused { track_id });
        Ok(())
    }

    /// Resume the active provider, or start the current queue entry when
    /// idle.
    pub async fn resume(&self) -> Result<()> {
        let Some(adapter) = self.active_adapter() else {
            return self.play_current_queue_entry().await;
        };

        if let Err(e) = adapter.play(None).await {
            warn!(provider = %adapter.provider(), error = %e, "Resume failed");
            return Ok(());
        }
        let track_id = self.state.update(|s| {
            s.is_playing = true;
            s.canonical_track_id.clone()
        })?;
        self.publish(PlaybackEvent::Resumed { track_id });
        Ok(())
    }

    pub async fn toggle_play_pause(&self) -> Result<()> {
        if self.state.read(|s| s.is_playing) {
            self.pause().await
        } else {
            self.resume().await
        }
    }

    /// Tear down the active provider and return to idle. The queue stays.
    pub async fn stop(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        let active = self.state.read(|s| s.active_provider);
        if let Some(adapter) = active.and_then(|p| self.registry.get(p)) {
            let done = within(self.config.timings.teardown_timeout, adapter.teardown()).await;
            if done.is_none() {
                warn!(provider = %adapter.provider(), "Teardown timed out during stop");
            }
        }

        let track_id = self.state.update(|s| {
            let track_id = s.canonical_track_id.take();
            reset_transport(s);
            track_id
        })?;
        if active.is_some() {
            self.publish(PlaybackEvent::Stopped { track_id });
        }
        Ok(())
    }

    /// Seek the active provider. Play/pause state is unchanged.
    pub async fn seek_to(&self, position: Duration) -> Result<()> {
        self.state.update(|s| s.pending_seek = Some(position))?;

        let Some(adapter) = self.active_adapter() else {
            debug!("Seek recorded while idle");
            return Ok(());
        };

        match adapter.seek_to(position).await {
            Ok(delivery) => {
                if delivery.is_delivered() {
                    self.clear_pending_seek(adapter.provider(), Some(position))?;
                } else {
                    debug!(provider = %adapter.provider(), "Seek buffered until the engine is ready");
                }
                self.state.update(|s| s.position = position)?;
            }
            Err(e) => warn!(provider = %adapter.provider(), error = %e, "Seek failed"),
        }
        Ok(())
    }

    /// Jump to a named section of the current track.
    pub async fn seek_to_section(&self, section_id: impl Into<String>, position: Duration) -> Result<()> {
        let section_id = section_id.into();
        self.state
            .update(|s| s.current_section_id = Some(section_id))?;
        self.seek_to(position).await
    }

    /// Set volume in 0.0..=1.0. Out-of-range values are clamped and
    /// non-finite values ignored.
    pub async fn set_volume(&self, level: f32) -> Result<()> {
        if !level.is_finite() {
            warn!(level, "Ignoring non-finite volume");
            return Ok(());
        }
        let level = level.clamp(0.0, 1.0);
        self.state.update(|s| s.volume = level)?;

        if let Some(adapter) = self.active_adapter() {
            if let Err(e) = adapter.set_volume(level).await {
                debug!(provider = %adapter.provider(), error = %e, "Volume change not applied");
            }
        }
        Ok(())
    }

    pub async fn set_muted(&self, muted: bool) -> Result<()> {
        self.state.update(|s| s.muted = muted)?;

        if let Some(adapter) = self.active_adapter() {
            if let Err(e) = adapter.set_mute(muted).await {
                debug!(provider = %adapter.provider(), error = %e, "Mute change not applied");
            }
        }
        Ok(())
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Advance the queue (wrapping) and play the new entry.
    pub async fn next_track(&self) -> Result<()> {
        self.advance(|queue| queue.next().is_some()).await
    }

    /// Step back in the queue (wrapping) and play the new entry.
    pub async fn previous_track(&self) -> Result<()> {
        self.advance(|queue| queue.previous().is_some()).await
    }

    /// Move the cursor to `index` and play it. Out of range is a no-op.
    pub async fn play_queue_index(&self, index: usize) -> Result<()> {
        self.advance(|queue| queue.jump_to(index).is_some()).await
    }

    pub fn enqueue(&self, track: Track) -> Result<()> {
        self.edit_queue(|queue| {
            queue.append(track);
            true
        })
    }

    pub fn enqueue_all(&self, tracks: impl IntoIterator<Item = Track>) -> Result<()> {
        let tracks: Vec<Track> = tracks.into_iter().collect();
        self.edit_queue(|queue| {
            let changed = !tracks.is_empty();
            tracks.into_iter().for_each(|track| queue.append(track));
            changed
        })
    }

    pub fn remove_from_queue(&self, index: usize) -> Result<Option<Track>> {
        let mut removed = None;
        self.edit_queue(|queue| {
            removed = queue.remove(index);
            removed.is_some()
        })?;
        Ok(removed)
    }

    /// Apply a permutation; see [`QueueManager::reorder`].
    pub fn reorder_queue(&self, order: &[usize]) -> Result<bool> {
        let mut applied = false;
        self.edit_queue(|queue| {
            applied = queue.reorder(order);
            applied
        })?;
        Ok(applied)
    }

    pub fn move_in_queue(&self, from: usize, to: usize) -> Result<bool> {
        let mut applied = false;
        self.edit_queue(|queue| {
            applied = queue.move_to(from, to) && from != to;
            applied
        })?;
        Ok(applied)
    }

    pub fn clear_queue(&self) -> Result<()> {
        self.edit_queue(|queue| {
            let changed = !queue.is_empty();
            queue.clear();
            changed
        })
    }

    pub fn shuffle_queue(&self) -> Result<()> {
        self.edit_queue(|queue| {
            queue.shuffle_from_current();
            queue.len() > 1
        })
    }

    /// Replace the queue without starting playback.
    pub fn set_queue(&self, tracks: Vec<Track>, start: usize) -> Result<()> {
        self.edit_queue(|queue| {
            queue.replace(tracks, start);
            true
        })
    }

    fn edit_queue(&self, edit: impl FnOnce(&mut QueueManager) -> bool) -> Result<()> {
        let (changed, length, index) = self.state.update(|s| {
            let changed = edit(&mut s.queue);
            (changed, s.queue.len(), s.queue.index())
        })?;
        if changed {
            self.publish(PlaybackEvent::QueueChanged { length, index });
        }
        Ok(())
    }

    async fn advance(&self, step: impl FnOnce(&mut QueueManager) -> bool) -> Result<()> {
        if self.state.read(|s| s.queue.is_empty()) {
            debug!("Queue empty, nothing to advance to");
            return Ok(());
        }

        let (moved, length, index) = self.state.update(|s| {
            let moved = step(&mut s.queue);
            (moved, s.queue.len(), s.queue.index())
        })?;
        if !moved {
            return Ok(());
        }
        self.publish(PlaybackEvent::QueueChanged { length, index });
        self.play_current_queue_entry().await
    }

    async fn play_current_queue_entry(&self) -> Result<()> {
        let Some(track) = self.state.read(|s| s.queue.current().cloned()) else {
            return Ok(());
        };

        let context = self.resolution_context().await;
        let Some(provider) = resolve_provider(&track, &context) else {
            warn!(track_id = %track.id, "No provider can play this track");
            self.publish(PlaybackEvent::Error {
                track_id: Some(track.id.clone()),
                provider: None,
                message: "No provider can play this track".to_string(),
                recoverable: false,
            });
            return Ok(());
        };

        let Some(provider_track_id) = track.provider_track_id(provider) else {
            return Ok(());
        };
        let request = OpenPlayerRequest::new(provider, provider_track_id)
            .for_track(track.id.clone())
            .with_context("queue");
        self.activate(request, PlayAction::Play).await
    }

    async fn resolution_context(&self) -> ResolutionContext {
        ResolutionContext {
            preferred: self.preferred_provider().await,
            streaming_session_active: self
                .registry
                .session_available(ProviderKind::Spotify)
                .await,
            available: self.registry.registered(),
        }
    }

    /// Persisted preference. Read only, never written here.
    async fn preferred_provider(&self) -> Option<ProviderKind> {
        let key = &self.config.preferred_provider_key;
        match self.config.settings.get_string(key).await {
            Ok(Some(value)) => match value.parse() {
                Ok(provider) => Some(provider),
                Err(e) => {
                    debug!(value = %value, error = %e, "Ignoring invalid provider preference");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read provider preference");
                None
            }
        }
    }

    // ========================================================================
    // Adapter notifications
    // ========================================================================

    /// Fold one adapter report into state. Reports from a provider that is
    /// no longer active are dropped.
    pub async fn handle_notification(&self, notification: AdapterNotification) -> Result<()> {
        let AdapterNotification { provider, kind } = notification;
        let (active, track_id) = self
            .state
            .read(|s| (s.active_provider, s.canonical_track_id.clone()));
        if active != Some(provider) {
            debug!(provider = %provider, "Dropping notification from inactive provider");
            return Ok(());
        }

        match kind {
            NotificationKind::Ready => {
                self.state.update(|s| s.pending_seek = None)?;
            }
            NotificationKind::PositionChanged { position, duration } => {
                self.state.update(|s| {
                    s.position = position;
                    if duration.is_some() {
                        s.duration = duration;
                    }
                })?;
                self.publish(PlaybackEvent::PositionChanged {
                    track_id,
                    position_ms: position.as_millis() as u64,
                    duration_ms: duration.map(|d| d.as_millis() as u64),
                });
            }
            NotificationKind::PlayingChanged(playing) => {
                self.state.update(|s| {
                    s.is_playing = playing;
                    if !playing {
                        s.autoplay_requested[provider] = false;
                    }
                })?;
            }
            NotificationKind::Ended => {
                let at_end = self.state.update(|s| {
                    s.is_playing = false;
                    s.queue.is_empty() || s.queue.is_at_end()
                })?;
                self.publish(PlaybackEvent::Completed { track_id });

                if self.config.features.auto_advance && !at_end {
                    self.next_track().await?;
                }
            }
            NotificationKind::Failed {
                message,
                recoverable,
            } => {
                warn!(provider = %provider, message = %message, "Engine reported failure");
                self.state.update(|s| s.is_playing = false)?;
                self.publish(PlaybackEvent::Error {
                    track_id,
                    provider: Some(provider.as_str().to_string()),
                    message,
                    recoverable,
                });
            }
        }
        Ok(())
    }

    /// Drain adapter notifications until `shutdown` fires or every sender
    /// is gone.
    pub async fn run_notifications(
        &self,
        mut receiver: NotificationReceiver,
        shutdown: CancellationToken,
    ) {
        loop {
            core_async::select! {
                _ = shutdown.cancelled() => {
                    debug!("Notification pump cancelled");
                    break;
                }
                next = receiver.recv() => match next {
                    Some(notification) => {
                        if let Err(e) = self.handle_notification(notification).await {
                            error!(error = %e, "Failed to apply adapter notification");
                        }
                    }
                    None => break,
                },
            }
        }
    }

    /// Tear down every adapter created this session and go idle.
    pub async fn shutdown(&self) -> Result<()> {
        let _transition = self.transition.lock().await;

        for adapter in self.registry.created() {
            let provider = adapter.provider();
            if within(self.config.timings.teardown_timeout, adapter.teardown())
                .await
                .is_none()
            {
                warn!(provider = %provider, "Teardown timed out during shutdown");
            }
        }

        self.state.update(reset_transport)?;
        info!("Playback orchestrator shut down");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn active_adapter(&self) -> Option<Arc<dyn ProviderAdapter>> {
        self.state
            .read(|s| s.active_provider)
            .and_then(|provider| self.registry.get(provider))
    }

    fn publish(&self, event: PlaybackEvent) {
        self.events.publish(CoreEvent::Playback(event));
    }

    fn publish_error(&self, track_id: Option<String>, provider: Option<ProviderKind>, error: &PlaybackError) {
        self.publish(PlaybackEvent::Error {
            track_id,
            provider: provider.map(|p| p.as_str().to_string()),
            message: error.to_string(),
            recoverable: error.is_transient(),
        });
    }
}

/// Clears every track, provider and seek field. Queue, volume and mute
/// survive.
fn reset_transport(state: &mut PlaybackState) {
    state.active_provider = None;
    state.canonical_track_id = None;
    state.provider_track_ids = ProviderMap::default();
    state.open = ProviderMap::default();
    state.autoplay_requested = ProviderMap::default();
    state.pending_seek = None;
    state.is_playing = false;
    state.current_section_id = None;
    state.position = Duration::ZERO;
    state.duration = None;
}
