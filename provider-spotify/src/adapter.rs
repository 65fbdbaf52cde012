//! Spotify streaming-audio adapter
//!
//! The SDK's local player is connected once per session and reports a
//! device id through `EngineSignal::Ready`. Tracks are started by moving
//! the user's playback to that device and then asking the Web API to play
//! the track there. Until the device is ready, `play`/`seek_to` are
//! buffered in the adapter's command slot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::{
    AccessTokenProvider, EngineSignal, HttpClient, ScriptLoader, ScriptSource,
    StreamingConnectOptions, StreamingEngine,
};
use core_async::sync::Mutex as AsyncMutex;
use core_playback::lifecycle::retry_once_after;
use core_playback::{
    AdapterContext, AdapterFactory, AutoplayGate, CueRequest, Delivery, EngineBootstrapper,
    EngineControl, EngineLifecycle, PendingCommand, PlaybackError, ProviderAdapter, ProviderKind,
};
use core_runtime::config::SessionConfig;
use core_runtime::events::EngineEvent;
use core_runtime::logging::redact_if_sensitive;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::api::ConnectApi;
use crate::error::SpotifyError;

type PlaybackResult<T> = core_playback::Result<T>;

/// Host bridges the adapter drives.
#[derive(Clone)]
pub struct SpotifyBridges {
    pub engine: Arc<dyn StreamingEngine>,
    pub script_loader: Arc<dyn ScriptLoader>,
    pub token_provider: Arc<dyn AccessTokenProvider>,
    pub http_client: Arc<dyn HttpClient>,
    pub session: SessionConfig,
}

/// Builds a registry factory producing one [`SpotifyAdapter`].
pub fn adapter_factory(bridges: SpotifyBridges) -> AdapterFactory {
    Box::new(move |context| {
        Ok(Arc::new(SpotifyAdapter::new(bridges.clone(), context)) as Arc<dyn ProviderAdapter>)
    })
}

#[derive(Debug)]
struct Session {
    access_token: Option<String>,
    device_id: Option<String>,
    /// Track loaded by the last cue.
    track_id: Option<String>,
    /// Start offset remembered for a cued (not autoplayed) track.
    cued_start: Option<Duration>,
    /// The cued track has been started on the device.
    started: bool,
    volume: f32,
    muted: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            access_token: None,
            device_id: None,
            track_id: None,
            cued_start: None,
            started: false,
            volume: 1.0,
            muted: false,
        }
    }
}

impl Session {
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }
}

pub struct SpotifyAdapter {
    engine: Arc<dyn StreamingEngine>,
    bootstrapper: EngineBootstrapper,
    api: ConnectApi,
    token_provider: Arc<dyn AccessTokenProvider>,
    session_config: SessionConfig,
    context: AdapterContext,
    control: Arc<EngineControl>,
    autoplay: AutoplayGate,
    session: Mutex<Session>,
    /// Set once no token was available; playback stays off for the session.
    disabled: AtomicBool,
    /// Serializes SDK loading and player connection.
    connecting: AsyncMutex<()>,
}

impl SpotifyAdapter {
    pub fn new(bridges: SpotifyBridges, context: AdapterContext) -> Self {
        let api = ConnectApi::new(bridges.http_client, context.timings.handoff_retry_delay);
        Self {
            engine: bridges.engine,
            bootstrapper: EngineBootstrapper::new(
                ProviderKind::Spotify,
                ScriptSource::spotify_web_playback(),
                bridges.script_loader,
            ),
            api,
            token_provider: bridges.token_provider,
            session_config: bridges.session,
            context,
            control: Arc::new(EngineControl::new()),
            autoplay: AutoplayGate::new(),
            session: Mutex::new(Session::default()),
            disabled: AtomicBool::new(false),
            connecting: AsyncMutex::new(()),
        }
    }

    /// Swap the Web API client (alternate base URL in tests).
    pub fn with_api(mut self, api: ConnectApi) -> Self {
        self.api = api;
        self
    }

    pub fn device_id(&self) -> Option<String> {
        self.session.lock().device_id.clone()
    }

    /// Load the SDK and connect the local player if not done yet.
    async fn ensure_connected(&self) -> PlaybackResult<()> {
        let _connecting = self.connecting.lock().await;

        let token = self.access_token().await?;
        self.session.lock().access_token = Some(token.clone());

        if !self.control.begin_loading() {
            return Ok(());
        }
        self.context
            .engine_event(|provider| EngineEvent::Loading { provider });

        if let Err(e) = self.bootstrapper.ensure_loaded().await {
            self.control.reset();
            return Err(e.into());
        }

        let volume = self.session.lock().effective_volume();
        let options = StreamingConnectOptions {
            player_name: self.session_config.player_name.clone(),
            access_token: token,
            volume,
        };
        if let Err(e) = self.engine.connect(options).await {
            self.control.reset();
            return Err(e.into());
        }

        info!(player_name = %self.session_config.player_name, "Spotify player connected");
        Ok(())
    }

    /// Fetches a token, disabling the adapter the first time none exists.
    async fn access_token(&self) -> PlaybackResult<String> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(SpotifyError::MissingToken.into());
        }

        let token = self
            .token_provider
            .get_valid_access_token(&self.session_config.user_id)
            .await
            .map_err(|e| PlaybackError::EngineUnavailable(e.to_string()))?;

        match token {
            Some(token) => {
                debug!(
                    token = %redact_if_sensitive("access_token", &token),
                    "Obtained Spotify access token"
                );
                Ok(token)
            }
            None => {
                if !self.disabled.swap(true, Ordering::SeqCst) {
                    warn!(
                        user_id = %self.session_config.user_id,
                        "No Spotify access token, disabling Spotify playback for this session"
                    );
                    self.context
                        .engine_event(|provider| EngineEvent::CredentialsUnavailable { provider });
                }
                Err(SpotifyError::MissingToken.into())
            }
        }
    }

    /// Hand the device over and start the cued track.
    async fn start_track(&self, start: Option<Duration>, programmatic: bool) -> PlaybackResult<()> {
        let (token, device_id, track_id, volume) = {
            let session = self.session.lock();
            (
                session.access_token.clone(),
                session.device_id.clone(),
                session.track_id.clone(),
                session.effective_volume(),
            )
        };
        let token = token.ok_or(SpotifyError::MissingToken)?;
        let device_id = device_id.ok_or(SpotifyError::NoDevice)?;
        let Some(track_id) = track_id else {
            debug!("Play requested with no track cued");
            return Ok(());
        };

        let workaround = programmatic && self.context.features.autoplay_workaround;
        let epoch = if workaround {
            if let Err(e) = self.engine.set_volume(0.0).await {
                debug!(error = %e, "Muting before autoplay failed");
            }
            Some(self.autoplay.arm())
        } else {
            None
        };

        let started = async {
            self.api
                .transfer_playback(&token, &device_id)
                .await
                .map_err(|e| PlaybackError::HandoffFailed(e.to_string()))?;
            self.api
                .start_playback(&token, &device_id, &track_id, start)
                .await
                .map_err(|e| PlaybackError::StartFailed(e.to_string()))
        }
        .await;

        if let Err(e) = started {
            if epoch.is_some() {
                self.autoplay.cancel();
                self.restore_volume(volume).await;
            }
            return Err(e);
        }

        {
            let mut session = self.session.lock();
            session.started = true;
            session.cued_start = None;
        }

        if let Some(epoch) = epoch {
            let engine = Arc::clone(&self.engine);
            self.autoplay
                .schedule_unmute(epoch, self.context.timings.unmute_delay, move || async move {
                    engine.set_volume(volume).await
                });
        }
        Ok(())
    }

    async fn restore_volume(&self, volume: f32) {
        if let Err(e) = self.engine.set_volume(volume).await {
            debug!(error = %e, "Restoring volume failed");
        }
    }

    async fn deliver_seek(&self, position: Duration) -> PlaybackResult<Delivery> {
        let started = {
            let mut session = self.session.lock();
            if !session.started {
                session.cued_start = Some(position);
            }
            session.started
        };
        if !started {
            return Ok(Delivery::Buffered);
        }

        let generation = self.control.generation();
        if let Err(e) = self.engine.seek(position).await {
            warn!(error = %e, position_ms = position.as_millis() as u64, "Seek rejected, retrying once");
            let engine = Arc::clone(&self.engine);
            retry_once_after(
                Arc::clone(&self.control),
                generation,
                self.context.timings.seek_retry_delay,
                "seek",
                move || async move { engine.seek(position).await },
            );
        }
        Ok(Delivery::Delivered)
    }

    async fn replay(&self, command: PendingCommand) {
        let result = match command {
            PendingCommand::Play { start } => self.start_track(start, true).await,
            PendingCommand::Seek(position) => self.deliver_seek(position).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!(error = %e, "Replaying buffered command failed");
            self.context
                .notifier
                .failed(e.to_string(), e.is_transient());
        }
    }
}

#[async_trait]
impl ProviderAdapter for SpotifyAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Spotify
    }

    fn lifecycle(&self) -> EngineLifecycle {
        self.control.lifecycle()
    }

    fn has_session(&self) -> bool {
        !self.disabled.load(Ordering::SeqCst)
    }

    async fn ensure_session(&self) -> PlaybackResult<()> {
        self.access_token().await.map(|_| ())
    }

    async fn session_active(&self) -> bool {
        if !self.has_session() {
            return false;
        }
        match self
            .token_provider
            .get_valid_access_token(&self.session_config.user_id)
            .await
        {
            Ok(token) => token.is_some_and(|token| !token.is_empty()),
            Err(e) => {
                debug!(error = %e, "Token lookup failed, treating session as inactive");
                false
            }
        }
    }

    #[instrument(skip(self), fields(track = %request.provider_track_id))]
    async fn cue(&self, request: CueRequest) -> PlaybackResult<Delivery> {
        {
            let mut session = self.session.lock();
            session.track_id = Some(request.provider_track_id.clone());
            session.cued_start = request.start;
            session.started = false;
        }
        self.control.clear_pending();
        self.ensure_connected().await?;

        if !request.autoplay {
            return Ok(Delivery::Buffered);
        }
        if self.control.play(request.start) {
            self.start_track(request.start, true).await?;
            Ok(Delivery::Delivered)
        } else {
            debug!("Spotify device not ready, play buffered");
            Ok(Delivery::Buffered)
        }
    }

    async fn play(&self, start: Option<Duration>) -> PlaybackResult<()> {
        if !self.control.play(start) {
            debug!("Spotify device not ready, play buffered");
            return Ok(());
        }

        let (started, cued_start, volume) = {
            let session = self.session.lock();
            (session.started, session.cued_start, session.effective_volume())
        };

        if !started {
            return self.start_track(start.or(cued_start), false).await;
        }

        self.autoplay.cancel();
        self.restore_volume(volume).await;
        if let Some(position) = start {
            self.engine.seek(position).await?;
        }
        self.engine.resume().await?;
        Ok(())
    }

    async fn pause(&self) -> PlaybackResult<()> {
        self.autoplay.cancel();
        let (started, volume) = {
            let session = self.session.lock();
            (session.started, session.effective_volume())
        };
        if !self.control.pause() || !started {
            return Ok(());
        }
        self.engine.pause().await?;
        self.restore_volume(volume).await;
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> PlaybackResult<Delivery> {
        if self.control.seek(position) {
            self.deliver_seek(position).await
        } else {
            debug!(position_ms = position.as_millis() as u64, "Spotify device not ready, seek buffered");
            Ok(Delivery::Buffered)
        }
    }

    async fn set_volume(&self, level: f32) -> PlaybackResult<()> {
        let volume = {
            let mut session = self.session.lock();
            session.volume = level.clamp(0.0, 1.0);
            session.effective_volume()
        };
        if self.control.is_ready() {
            self.engine.set_volume(volume).await?;
        }
        Ok(())
    }

    async fn set_mute(&self, muted: bool) -> PlaybackResult<()> {
        self.autoplay.cancel();
        let volume = {
            let mut session = self.session.lock();
            session.muted = muted;
            session.effective_volume()
        };
        if self.control.is_ready() {
            self.engine.set_volume(volume).await?;
        }
        Ok(())
    }

    async fn teardown(&self) {
        self.autoplay.cancel();
        let was_live = self.control.lifecycle() != EngineLifecycle::Uninitialized;
        self.control.reset();
        {
            let mut session = self.session.lock();
            session.device_id = None;
            session.track_id = None;
            session.cued_start = None;
            session.started = false;
        }

        if was_live {
            if let Err(e) = self.engine.disconnect().await {
                warn!(error = %e, "Spotify disconnect failed");
            }
            self.context
                .engine_event(|provider| EngineEvent::TornDown { provider });
            info!("Spotify player torn down");
        }
    }

    async fn handle_signal(&self, signal: EngineSignal) {
        debug!(signal = signal.name(), "Spotify engine signal");
        match signal {
            EngineSignal::Ready { device_id } => {
                let Some(device_id) = device_id else {
                    warn!("Spotify ready without a device id");
                    return;
                };
                if self.control.lifecycle() == EngineLifecycle::Uninitialized {
                    debug!("Ignoring ready from a torn-down player");
                    return;
                }
                self.session.lock().device_id = Some(device_id);
                let pending = self.control.mark_ready();
                self.context
                    .engine_event(|provider| EngineEvent::Ready { provider });
                self.context.notifier.ready();

                if let Some(command) = pending {
                    self.replay(command).await;
                }
            }
            EngineSignal::NotReady => {
                warn!("Spotify device went offline");
                self.session.lock().device_id = None;
                self.control.mark_not_ready();
            }
            EngineSignal::StateChanged(status) => {
                self.context.notifier.position(status.position, status.duration);
                self.context.notifier.playing(status.playing);
            }
            EngineSignal::Progress { position, duration } => {
                self.context.notifier.position(position, duration);
            }
            EngineSignal::Ended => {
                self.session.lock().started = false;
                self.context.notifier.ended();
            }
            EngineSignal::Error { message } => {
                warn!(message = %message, "Spotify player error");
                self.context.notifier.failed(message, true);
            }
            EngineSignal::VideoStateChanged { .. } => {
                debug!("Ignoring video state signal on the streaming engine");
            }
        }
    }
}
