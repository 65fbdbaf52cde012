//! YouTube adapter flows against a recording IFrame player.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{EngineSignal, ScriptLoader, ScriptSource, VideoEngine, VideoPlayerOptions};
use core_async::sync::mpsc;
use core_playback::{
    AdapterContext, AdapterNotification, AdapterNotifier, CueRequest, Delivery, EngineLifecycle,
    NotificationKind, PlaybackError, ProviderAdapter, ProviderKind,
};
use core_runtime::config::{EngineTimings, FeatureFlags};
use core_runtime::events::{CoreEvent, EngineEvent, EventBus};
use mockall::mock;
use parking_lot::Mutex;
use provider_youtube::{YouTubeAdapter, YouTubeBridges};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const FIRST: &str = "dQw4w9WgXcQ";
const SECOND: &str = "9bZkp7q19f0";

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct RecordingPlayer {
    log: Log,
    /// Number of upcoming seeks to reject.
    failing_seeks: AtomicUsize,
}

fn with_start(label: String, start: Option<Duration>) -> String {
    match start {
        Some(start) => format!("{label}@{}", start.as_secs()),
        None => label,
    }
}

#[async_trait]
impl VideoEngine for RecordingPlayer {
    async fn create_player(&self, options: VideoPlayerOptions) -> BridgeResult<()> {
        let label = format!(
            "create:{} autoplay={} muted={}",
            options.video_id, options.autoplay, options.muted
        );
        self.log.lock().push(with_start(label, options.start));
        Ok(())
    }

    async fn load_video(&self, video_id: &str, start: Option<Duration>) -> BridgeResult<()> {
        self.log
            .lock()
            .push(with_start(format!("load_video:{video_id}"), start));
        Ok(())
    }

    async fn cue_video(&self, video_id: &str, start: Option<Duration>) -> BridgeResult<()> {
        self.log
            .lock()
            .push(with_start(format!("cue_video:{video_id}"), start));
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.log.lock().push("play".to_string());
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.log.lock().push("pause".to_string());
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> BridgeResult<()> {
        self.log.lock().push(format!("seek:{}", position.as_secs()));
        let rejected = self
            .failing_seeks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if rejected {
            Err(BridgeError::rejected("seekTo", "player not attached"))
        } else {
            Ok(())
        }
    }

    async fn set_volume(&self, percent: u8) -> BridgeResult<()> {
        self.log.lock().push(format!("volume:{percent}"));
        Ok(())
    }

    async fn mute(&self) -> BridgeResult<()> {
        self.log.lock().push("mute".to_string());
        Ok(())
    }

    async fn unmute(&self) -> BridgeResult<()> {
        self.log.lock().push("unmute".to_string());
        Ok(())
    }

    async fn destroy(&self) -> BridgeResult<()> {
        self.log.lock().push("destroy".to_string());
        Ok(())
    }
}

struct RecordingLoader {
    log: Log,
}

#[async_trait]
impl ScriptLoader for RecordingLoader {
    async fn load(&self, source: &ScriptSource) -> BridgeResult<()> {
        self.log.lock().push(format!("load:{}", source.ready_callback));
        Ok(())
    }
}

struct Fixture {
    adapter: YouTubeAdapter,
    player: Arc<RecordingPlayer>,
    notifications: mpsc::UnboundedReceiver<AdapterNotification>,
    events: core_runtime::events::Receiver<CoreEvent>,
}

impl Fixture {
    fn log(&self) -> Vec<String> {
        self.player.log.lock().clone()
    }

    fn count(&self, entry: &str) -> usize {
        self.log().iter().filter(|e| *e == entry).count()
    }

    /// Entries recorded after the first `marker`.
    fn after(&self, marker: &str) -> Vec<String> {
        let log = self.log();
        let at = log
            .iter()
            .position(|e| e == marker)
            .unwrap_or_else(|| panic!("{marker} not in {log:?}"));
        log[at + 1..].to_vec()
    }
}

fn context(tx: mpsc::UnboundedSender<AdapterNotification>, bus: EventBus) -> AdapterContext {
    AdapterContext {
        notifier: AdapterNotifier::new(ProviderKind::YouTube, tx),
        events: bus,
        timings: EngineTimings::default(),
        features: FeatureFlags::default(),
    }
}

fn fixture() -> Fixture {
    let player = Arc::new(RecordingPlayer::default());
    let (tx, notifications) = mpsc::unbounded_channel();
    let bus = EventBus::new(32);
    let events = bus.subscribe();

    let bridges = YouTubeBridges {
        engine: player.clone(),
        script_loader: Arc::new(RecordingLoader {
            log: player.log.clone(),
        }),
    };

    Fixture {
        adapter: YouTubeAdapter::new(bridges, context(tx, bus)),
        player,
        notifications,
        events,
    }
}

fn cue(video: &str, autoplay: bool) -> CueRequest {
    CueRequest {
        provider_track_id: video.to_string(),
        autoplay,
        start: None,
    }
}

fn ready() -> EngineSignal {
    EngineSignal::Ready { device_id: None }
}

fn strings(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_first_cue_creates_player_and_autoplays_muted() {
    let mut f = fixture();

    f.adapter.cue(cue(FIRST, true)).await.unwrap();
    assert_eq!(f.adapter.lifecycle(), EngineLifecycle::Loading);

    f.adapter.handle_signal(ready()).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        f.log(),
        strings(&[
            "load:onYouTubeIframeAPIReady",
            "create:dQw4w9WgXcQ autoplay=true muted=true",
            "volume:100",
            "mute",
            "play",
            "unmute",
        ])
    );
    assert_eq!(f.notifications.recv().await.unwrap().kind, NotificationKind::Ready);
}

/// Player whose creation blocks until the test opens the gate.
struct GatedPlayer {
    inner: Arc<RecordingPlayer>,
    gate: Arc<Notify>,
}

#[async_trait]
impl VideoEngine for GatedPlayer {
    async fn create_player(&self, options: VideoPlayerOptions) -> BridgeResult<()> {
        self.inner.create_player(options).await?;
        self.gate.notified().await;
        Ok(())
    }
    async fn load_video(&self, video_id: &str, start: Option<Duration>) -> BridgeResult<()> {
        self.inner.load_video(video_id, start).await
    }
    async fn cue_video(&self, video_id: &str, start: Option<Duration>) -> BridgeResult<()> {
        self.inner.cue_video(video_id, start).await
    }
    async fn play(&self) -> BridgeResult<()> {
        self.inner.play().await
    }
    async fn pause(&self) -> BridgeResult<()> {
        self.inner.pause().await
    }
    async fn seek_to(&self, position: Duration) -> BridgeResult<()> {
        self.inner.seek_to(position).await
    }
    async fn set_volume(&self, percent: u8) -> BridgeResult<()> {
        self.inner.set_volume(percent).await
    }
    async fn mute(&self) -> BridgeResult<()> {
        self.inner.mute().await
    }
    async fn unmute(&self) -> BridgeResult<()> {
        self.inner.unmute().await
    }
    async fn destroy(&self) -> BridgeResult<()> {
        self.inner.destroy().await
    }
}

#[tokio::test(start_paused = true)]
async fn test_ready_during_player_creation_still_autoplays() {
    let recording = Arc::new(RecordingPlayer::default());
    let gate = Arc::new(Notify::new());
    let (tx, _notifications) = mpsc::unbounded_channel();
    let bridges = YouTubeBridges {
        engine: Arc::new(GatedPlayer {
            inner: recording.clone(),
            gate: gate.clone(),
        }),
        script_loader: Arc::new(RecordingLoader {
            log: recording.log.clone(),
        }),
    };
    let adapter = Arc::new(YouTubeAdapter::new(bridges, context(tx, EventBus::new(8))));

    let cueing = tokio::spawn({
        let adapter = adapter.clone();
        async move { adapter.cue(cue(FIRST, true)).await }
    });
    let created = "create:dQw4w9WgXcQ autoplay=true muted=true".to_string();
    while !recording.log.lock().contains(&created) {
        tokio::task::yield_now().await;
    }

    adapter.handle_signal(ready()).await;
    gate.notify_one();
    assert_eq!(cueing.await.unwrap().unwrap(), Delivery::Buffered);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(
        recording.log.lock().clone(),
        strings(&[
            "load:onYouTubeIframeAPIReady",
            "create:dQw4w9WgXcQ autoplay=true muted=true",
            "volume:100",
            "mute",
            "play",
            "unmute",
        ])
    );
    assert_eq!(adapter.loaded_video().as_deref(), Some(FIRST));
}

#[tokio::test(start_paused = true)]
async fn test_seek_reports_buffered_until_ready() {
    let f = fixture();
    f.adapter.cue(cue(FIRST, false)).await.unwrap();

    assert_eq!(
        f.adapter.seek_to(Duration::from_secs(10)).await.unwrap(),
        Delivery::Buffered
    );
    f.adapter.handle_signal(ready()).await;
    assert_eq!(
        f.adapter.seek_to(Duration::from_secs(20)).await.unwrap(),
        Delivery::Delivered
    );
    assert_eq!(
        f.adapter.cue(cue(SECOND, false)).await.unwrap(),
        Delivery::Delivered
    );
}

#[tokio::test(start_paused = true)]
async fn test_next_video_reuses_live_player() {
    let f = fixture();
    f.adapter.cue(cue(FIRST, false)).await.unwrap();
    f.adapter.handle_signal(ready()).await;

    f.adapter
        .cue(CueRequest {
            provider_track_id: format!("https://youtu.be/{SECOND}"),
            autoplay: true,
            start: Some(Duration::from_secs(12)),
        })
        .await
        .unwrap();
    f.adapter.cue(cue(FIRST, false)).await.unwrap();

    assert_eq!(f.log().iter().filter(|e| e.starts_with("create:")).count(), 1);
    assert_eq!(
        f.after("volume:100"),
        strings(&["mute", "load_video:9bZkp7q19f0@12", "cue_video:dQw4w9WgXcQ"])
    );
    assert_eq!(f.adapter.loaded_video().as_deref(), Some(FIRST));
}

#[tokio::test(start_paused = true)]
async fn test_cue_during_loading_syncs_latest_video_on_ready() {
    let f = fixture();
    f.adapter.cue(cue(FIRST, true)).await.unwrap();
    f.adapter.cue(cue(SECOND, true)).await.unwrap();

    f.adapter.handle_signal(ready()).await;

    assert_eq!(
        f.after("volume:100"),
        strings(&["cue_video:9bZkp7q19f0", "mute", "play"])
    );
    assert_eq!(f.adapter.loaded_video().as_deref(), Some(SECOND));
}

#[tokio::test(start_paused = true)]
async fn test_pause_cancels_delayed_unmute() {
    let f = fixture();
    f.adapter.cue(cue(FIRST, true)).await.unwrap();
    f.adapter.handle_signal(ready()).await;

    f.adapter.pause().await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(f.after("play"), strings(&["pause", "unmute"]));
    assert_eq!(f.count("unmute"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_user_mute_wins_over_autoplay_unmute() {
    let f = fixture();
    f.adapter.cue(cue(FIRST, true)).await.unwrap();
    f.adapter.handle_signal(ready()).await;

    f.adapter.set_mute(true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(f.after("play"), strings(&["mute"]));
    assert_eq!(f.count("unmute"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_buffered_seeks_apply_latest_once() {
    let f = fixture();
    f.adapter.cue(cue(FIRST, false)).await.unwrap();
    f.adapter.seek_to(Duration::from_secs(42)).await.unwrap();
    f.adapter.seek_to(Duration::from_secs(77)).await.unwrap();
    assert!(!f.log().iter().any(|e| e.starts_with("seek:")));

    f.adapter.handle_signal(ready()).await;

    let seeks: Vec<_> = f
        .log()
        .into_iter()
        .filter(|e| e.starts_with("seek:"))
        .collect();
    assert_eq!(seeks, strings(&["seek:77"]));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_seek_is_retried_once() {
    let f = fixture();
    f.player.failing_seeks.store(1, Ordering::SeqCst);
    f.adapter.cue(cue(FIRST, false)).await.unwrap();
    f.adapter.handle_signal(ready()).await;

    f.adapter.seek_to(Duration::from_secs(30)).await.unwrap();
    assert_eq!(f.count("seek:30"), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(f.count("seek:30"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_newer_command_supersedes_seek_retry() {
    let f = fixture();
    f.player.failing_seeks.store(1, Ordering::SeqCst);
    f.adapter.cue(cue(FIRST, false)).await.unwrap();
    f.adapter.handle_signal(ready()).await;

    f.adapter.seek_to(Duration::from_secs(30)).await.unwrap();
    f.adapter.seek_to(Duration::from_secs(40)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(f.after("volume:100"), strings(&["seek:30", "seek:40"]));
}

#[tokio::test(start_paused = true)]
async fn test_volume_maps_to_percent() {
    let f = fixture();
    f.adapter.set_volume(0.25).await.unwrap();
    f.adapter.cue(cue(FIRST, false)).await.unwrap();
    f.adapter.handle_signal(ready()).await;
    f.adapter.set_volume(0.6).await.unwrap();

    assert_eq!(f.count("volume:25"), 1);
    assert_eq!(f.log().last().unwrap(), "volume:60");
}

#[tokio::test]
async fn test_state_codes_become_notifications() {
    let mut f = fixture();

    for code in [-1, 3, 1, 2, 5, 0, 42] {
        f.adapter
            .handle_signal(EngineSignal::VideoStateChanged { code })
            .await;
    }

    let mut kinds = Vec::new();
    while let Ok(notification) = f.notifications.try_recv() {
        assert_eq!(notification.provider, ProviderKind::YouTube);
        kinds.push(notification.kind);
    }
    assert_eq!(
        kinds,
        vec![
            NotificationKind::PlayingChanged(true),
            NotificationKind::PlayingChanged(false),
            NotificationKind::Ended,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_teardown_destroys_player_once() {
    let mut f = fixture();
    f.adapter.cue(cue(FIRST, false)).await.unwrap();
    f.adapter.handle_signal(ready()).await;

    f.adapter.teardown().await;
    f.adapter.teardown().await;
    f.adapter.handle_signal(ready()).await;
    assert_eq!(f.count("destroy"), 1);
    assert_eq!(f.adapter.lifecycle(), EngineLifecycle::Uninitialized);
    assert_eq!(f.adapter.loaded_video(), None);

    let mut torn_down = 0;
    while let Ok(event) = f.events.try_recv() {
        if matches!(event, CoreEvent::Engine(EngineEvent::TornDown { .. })) {
            torn_down += 1;
        }
    }
    assert_eq!(torn_down, 1);

    f.adapter.cue(cue(SECOND, false)).await.unwrap();
    assert_eq!(f.log().iter().filter(|e| e.starts_with("create:")).count(), 2);
    assert_eq!(f.count("load:onYouTubeIframeAPIReady"), 1);
}

mock! {
    Player {}

    #[async_trait]
    impl VideoEngine for Player {
        async fn create_player(&self, options: VideoPlayerOptions) -> BridgeResult<()>;
        async fn load_video(&self, video_id: &str, start: Option<Duration>) -> BridgeResult<()>;
        async fn cue_video(&self, video_id: &str, start: Option<Duration>) -> BridgeResult<()>;
        async fn play(&self) -> BridgeResult<()>;
        async fn pause(&self) -> BridgeResult<()>;
        async fn seek_to(&self, position: Duration) -> BridgeResult<()>;
        async fn set_volume(&self, percent: u8) -> BridgeResult<()>;
        async fn mute(&self) -> BridgeResult<()>;
        async fn unmute(&self) -> BridgeResult<()>;
        async fn destroy(&self) -> BridgeResult<()>;
    }
}

#[tokio::test]
async fn test_invalid_video_id_never_reaches_player() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let log: Log = Arc::default();
    let adapter = YouTubeAdapter::new(
        YouTubeBridges {
            engine: Arc::new(MockPlayer::new()),
            script_loader: Arc::new(RecordingLoader { log: log.clone() }),
        },
        context(tx, EventBus::new(8)),
    );

    let error = adapter.cue(cue("not a video", true)).await.unwrap_err();

    assert!(matches!(error, PlaybackError::StartFailed(_)));
    assert_eq!(adapter.lifecycle(), EngineLifecycle::Uninitialized);
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn test_create_failure_returns_to_uninitialized() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut engine = MockPlayer::new();
    engine
        .expect_create_player()
        .times(1)
        .withf(|options| options.video_id == FIRST && options.autoplay && options.muted)
        .returning(|_| Err(BridgeError::NotAvailable("iframe host missing".to_string())));

    let adapter = YouTubeAdapter::new(
        YouTubeBridges {
            engine: Arc::new(engine),
            script_loader: Arc::new(RecordingLoader { log: Arc::default() }),
        },
        context(tx, EventBus::new(8)),
    );

    let error = adapter.cue(cue(FIRST, true)).await.unwrap_err();
    assert!(matches!(error, PlaybackError::EngineUnavailable(_)));
    assert_eq!(adapter.lifecycle(), EngineLifecycle::Uninitialized);
}
