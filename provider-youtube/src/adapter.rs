//! YouTube video adapter
//!
//! The IFrame API is bootstrapped once; the player element is created on the
//! first cue and reused for every later video. The player reports readiness
//! through `EngineSignal::Ready` and transport changes through raw state
//! codes (`EngineSignal::VideoStateChanged`).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::{EngineSignal, ScriptLoader, ScriptSource, VideoEngine, VideoPlayerOptions};
use core_async::sync::Mutex as AsyncMutex;
use core_playback::lifecycle::retry_once_after;
use core_playback::{
    AdapterContext, AdapterFactory, AutoplayGate, CueRequest, Delivery, EngineBootstrapper,
    EngineControl, EngineLifecycle, PendingCommand, ProviderAdapter, ProviderKind,
};
use core_runtime::events::EngineEvent;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::types::{parse_video_id, volume_percent, PlayerState};

type PlaybackResult<T> = core_playback::Result<T>;

/// Host bridges the adapter drives.
#[derive(Clone)]
pub struct YouTubeBridges {
    pub engine: Arc<dyn VideoEngine>,
    pub script_loader: Arc<dyn ScriptLoader>,
}

/// Builds a registry factory producing one [`YouTubeAdapter`].
pub fn adapter_factory(bridges: YouTubeBridges) -> AdapterFactory {
    Box::new(move |context| {
        Ok(Arc::new(YouTubeAdapter::new(bridges.clone(), context)) as Arc<dyn ProviderAdapter>)
    })
}

#[derive(Debug)]
struct Player {
    /// Video requested by the last cue.
    video_id: Option<String>,
    /// Video the native player currently holds.
    loaded_video: Option<String>,
    cued_start: Option<Duration>,
    volume: f32,
    /// Mute requested by the user.
    muted: bool,
    /// Muted by the autoplay workaround, not by the user.
    autoplay_muted: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            video_id: None,
            loaded_video: None,
            cued_start: None,
            volume: 1.0,
            muted: false,
            autoplay_muted: false,
        }
    }
}

pub struct YouTubeAdapter {
    engine: Arc<dyn VideoEngine>,
    bootstrapper: EngineBootstrapper,
    context: AdapterContext,
    control: Arc<EngineControl>,
    autoplay: AutoplayGate,
    player: Arc<Mutex<Player>>,
    /// Serializes API bootstrap and player creation.
    creating: AsyncMutex<()>,
}

impl YouTubeAdapter {
    pub fn new(bridges: YouTubeBridges, context: AdapterContext) -> Self {
        Self {
            engine: bridges.engine,
            bootstrapper: EngineBootstrapper::new(
                ProviderKind::YouTube,
                ScriptSource::youtube_iframe_api(),
                bridges.script_loader,
            ),
            context,
            control: Arc::new(EngineControl::new()),
            autoplay: AutoplayGate::new(),
            player: Arc::new(Mutex::new(Player::default())),
            creating: AsyncMutex::new(()),
        }
    }

    /// Video currently loaded in the native player.
    pub fn loaded_video(&self) -> Option<String> {
        self.player.lock().loaded_video.clone()
    }

    fn workaround_enabled(&self) -> bool {
        self.context.features.autoplay_workaround
    }

    /// Load the IFrame API and create the player element with `video_id`.
    async fn create_player(
        &self,
        video_id: &str,
        autoplay: bool,
        start: Option<Duration>,
    ) -> PlaybackResult<()> {
        let _creating = self.creating.lock().await;
        if !self.control.begin_loading() {
            return Ok(());
        }
        self.context
            .engine_event(|provider| EngineEvent::Loading { provider });

        if let Err(e) = self.bootstrapper.ensure_loaded().await {
            self.control.reset();
            return Err(e.into());
        }

        // The player is born holding `video_id`; a ready signal racing the
        // create call must not cue it again.
        let muted = {
            let mut player = self.player.lock();
            player.autoplay_muted = autoplay && self.workaround_enabled();
            player.loaded_video = Some(video_id.to_string());
            player.muted || player.autoplay_muted
        };
        let options = VideoPlayerOptions {
            video_id: video_id.to_string(),
            autoplay,
            muted,
            start,
        };
        if let Err(e) = self.engine.create_player(options).await {
            self.control.reset();
            let mut player = self.player.lock();
            player.autoplay_muted = false;
            player.loaded_video = None;
            return Err(e.into());
        }

        info!(video_id, "YouTube player created");
        Ok(())
    }

    /// Swap the video on the live player without recreating it.
    async fn load_on_live_player(
        &self,
        video_id: &str,
        autoplay: bool,
        start: Option<Duration>,
    ) -> PlaybackResult<Delivery> {
        if !autoplay {
            self.engine.cue_video(video_id, start).await?;
            self.player.lock().loaded_video = Some(video_id.to_string());
            return Ok(Delivery::Delivered);
        }

        if !self.control.play(start) {
            debug!("YouTube player lost readiness, video synced on ready");
            return Ok(Delivery::Buffered);
        }
        let epoch = self.mute_for_autoplay().await;
        if let Err(e) = self.engine.load_video(video_id, start).await {
            self.autoplay.cancel();
            self.restore_after_autoplay().await;
            return Err(e.into());
        }
        self.player.lock().loaded_video = Some(video_id.to_string());
        self.schedule_unmute(epoch);
        Ok(Delivery::Delivered)
    }

    /// Start the loaded video without a user gesture.
    async fn start_programmatic(&self, start: Option<Duration>) -> PlaybackResult<()> {
        let epoch = self.mute_for_autoplay().await;
        let started = async {
            if let Some(position) = start {
                self.engine.seek_to(position).await?;
            }
            self.engine.play().await
        }
        .await;

        if let Err(e) = started {
            self.autoplay.cancel();
            self.restore_after_autoplay().await;
            return Err(e.into());
        }
        self.schedule_unmute(epoch);
        Ok(())
    }

    async fn mute_for_autoplay(&self) -> Option<u64> {
        if !self.workaround_enabled() {
            return None;
        }
        if let Err(e) = self.engine.mute().await {
            debug!(error = %e, "Muting before autoplay failed");
        }
        self.player.lock().autoplay_muted = true;
        Some(self.autoplay.arm())
    }

    fn schedule_unmute(&self, epoch: Option<u64>) {
        let Some(epoch) = epoch else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        let player = Arc::clone(&self.player);
        self.autoplay
            .schedule_unmute(epoch, self.context.timings.unmute_delay, move || async move {
                let user_muted = {
                    let mut player = player.lock();
                    player.autoplay_muted = false;
                    player.muted
                };
                if user_muted {
                    Ok(())
                } else {
                    engine.unmute().await
                }
            });
    }

    /// Undo a workaround mute that has not been lifted yet.
    async fn restore_after_autoplay(&self) {
        let restore = {
            let mut player = self.player.lock();
            std::mem::take(&mut player.autoplay_muted) && !player.muted
        };
        if restore {
            if let Err(e) = self.engine.unmute().await {
                debug!(error = %e, "Restoring sound failed");
            }
        }
    }

    async fn deliver_seek(&self, position: Duration) -> PlaybackResult<Delivery> {
        let generation = self.control.generation();
        if let Err(e) = self.engine.seek_to(position).await {
            warn!(error = %e, position_ms = position.as_millis() as u64, "Seek rejected, retrying once");
            let engine = Arc::clone(&self.engine);
            retry_once_after(
                Arc::clone(&self.control),
                generation,
                self.context.timings.seek_retry_delay,
                "seek",
                move || async move { engine.seek_to(position).await },
            );
        }
        Ok(Delivery::Delivered)
    }

    /// Bring the player up to the latest cued video after it became ready.
    async fn sync_video(&self) {
        let target = {
            let player = self.player.lock();
            match &player.video_id {
                Some(id) if player.loaded_video.as_ref() != Some(id) => {
                    Some((id.clone(), player.cued_start))
                }
                _ => None,
            }
        };
        let Some((video_id, start)) = target else {
            return;
        };
        match self.engine.cue_video(&video_id, start).await {
            Ok(()) => self.player.lock().loaded_video = Some(video_id),
            Err(e) => warn!(error = %e, video_id = %video_id, "Cueing latest video failed"),
        }
    }

    async fn apply_audio_settings(&self) {
        let (volume, muted) = {
            let player = self.player.lock();
            (player.volume, player.muted)
        };
        if let Err(e) = self.engine.set_volume(volume_percent(volume)).await {
            debug!(error = %e, "Applying volume failed");
        }
        if muted {
            if let Err(e) = self.engine.mute().await {
                debug!(error = %e, "Applying mute failed");
            }
        }
    }

    async fn replay(&self, command: PendingCommand) {
        let result = match command {
            PendingCommand::Play { start } => self.start_programmatic(start).await,
            PendingCommand::Seek(position) => self.deliver_seek(position).await.map(|_| ()),
        };
        if let Err(e) = result {
            warn!(error = %e, "Replaying buffered command failed");
            self.context
                .notifier
                .failed(e.to_string(), e.is_transient());
        }
    }

    fn handle_state_code(&self, code: i32) {
        match PlayerState::from_code(code) {
            Some(PlayerState::Playing) => self.context.notifier.playing(true),
            Some(PlayerState::Paused) => self.context.notifier.playing(false),
            Some(PlayerState::Ended) => self.context.notifier.ended(),
            Some(state) => debug!(?state, "YouTube player state"),
            None => debug!(code, "Unknown YouTube player state code"),
        }
    }
}

#[async_trait]
impl ProviderAdapter for YouTubeAdapter {
    fn provider(&self) -> ProviderKind {
        ProviderKind::YouTube
    }

    fn lifecycle(&self) -> EngineLifecycle {
        self.control.lifecycle()
    }

    #[instrument(skip(self), fields(track = %request.provider_track_id))]
    async fn cue(&self, request: CueRequest) -> PlaybackResult<Delivery> {
        let video_id = parse_video_id(&request.provider_track_id)?;
        {
            let mut player = self.player.lock();
            player.video_id = Some(video_id.clone());
            player.cued_start = request.start;
        }
        self.control.clear_pending();

        match self.control.lifecycle() {
            EngineLifecycle::Ready => {
                self.load_on_live_player(&video_id, request.autoplay, request.start)
                    .await
            }
            EngineLifecycle::Uninitialized => {
                // Buffered before creation so a ready signal arriving while
                // the player is being built still replays it.
                if request.autoplay {
                    self.control.play(request.start);
                }
                self.create_player(&video_id, request.autoplay, request.start)
                    .await?;
                Ok(Delivery::Buffered)
            }
            EngineLifecycle::Loading => {
                debug!("YouTube player still loading, video synced on ready");
                if request.autoplay {
                    self.control.play(request.start);
                }
                Ok(Delivery::Buffered)
            }
        }
    }

    async fn play(&self, start: Option<Duration>) -> PlaybackResult<()> {
        if !self.control.play(start) {
            debug!("YouTube player not ready, play buffered");
            return Ok(());
        }
        self.autoplay.cancel();
        self.restore_after_autoplay().await;
        if let Some(position) = start {
            self.engine.seek_to(position).await?;
        }
        self.engine.play().await?;
        Ok(())
    }

    async fn pause(&self) -> PlaybackResult<()> {
        self.autoplay.cancel();
        if !self.control.pause() {
            return Ok(());
        }
        self.engine.pause().await?;
        self.restore_after_autoplay().await;
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> PlaybackResult<Delivery> {
        if self.control.seek(position) {
            self.deliver_seek(position).await
        } else {
            debug!(position_ms = position.as_millis() as u64, "YouTube player not ready, seek buffered");
            Ok(Delivery::Buffered)
        }
    }

    async fn set_volume(&self, level: f32) -> PlaybackResult<()> {
        let level = level.clamp(0.0, 1.0);
        self.player.lock().volume = level;
        if self.control.is_ready() {
            self.engine.set_volume(volume_percent(level)).await?;
        }
        Ok(())
    }

    async fn set_mute(&self, muted: bool) -> PlaybackResult<()> {
        self.autoplay.cancel();
        {
            let mut player = self.player.lock();
            player.muted = muted;
            player.autoplay_muted = false;
        }
        if self.control.is_ready() {
            if muted {
                self.engine.mute().await?;
            } else {
                self.engine.unmute().await?;
            }
        }
        Ok(())
    }

    async fn teardown(&self) {
        self.autoplay.cancel();
        let was_live = self.control.lifecycle() != EngineLifecycle::Uninitialized;
        self.control.reset();
        {
            let mut player = self.player.lock();
            player.video_id = None;
            player.loaded_video = None;
            player.cued_start = None;
            player.autoplay_muted = false;
        }

        if was_live {
            if let Err(e) = self.engine.destroy().await {
                warn!(error = %e, "YouTube player destroy failed");
            }
            self.context
                .engine_event(|provider| EngineEvent::TornDown { provider });
            info!("YouTube player torn down");
        }
    }

    async fn handle_signal(&self, signal: EngineSignal) {
        debug!(signal = signal.name(), "YouTube engine signal");
        match signal {
            EngineSignal::Ready { .. } => {
                if self.control.lifecycle() == EngineLifecycle::Uninitialized {
                    debug!("Ignoring ready from a destroyed player");
                    return;
                }
                let pending = self.control.mark_ready();
                self.apply_audio_settings().await;
                self.context
                    .engine_event(|provider| EngineEvent::Ready { provider });
                self.context.notifier.ready();

                self.sync_video().await;
                if let Some(command) = pending {
                    self.replay(command).await;
                }
            }
            EngineSignal::NotReady => {
                warn!("YouTube player lost readiness");
                self.control.mark_not_ready();
            }
            EngineSignal::VideoStateChanged { code } => self.handle_state_code(code),
            EngineSignal::StateChanged(status) => {
                self.context.notifier.position(status.position, status.duration);
                self.context.notifier.playing(status.playing);
            }
            EngineSignal::Progress { position, duration } => {
                self.context.notifier.position(position, duration);
            }
            EngineSignal::Ended => self.context.notifier.ended(),
            EngineSignal::Error { message } => {
                warn!(message = %message, "YouTube player error");
                self.context.notifier.failed(message, false);
            }
        }
    }
}
