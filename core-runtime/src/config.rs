//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all bridges and settings the orchestrator and its
//! provider adapters need. It enforces fail-fast validation so a host that
//! forgot to inject a capability learns about it at startup, not on the first
//! `play()`.
//!
//! ## Required Dependencies
//!
//! - `ScriptLoader` - Loads the vendor SDK scripts
//! - At least one of `StreamingEngine` / `VideoEngine`
//! - `AccessTokenProvider` - Required whenever a `StreamingEngine` is provided
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `HttpClient` - Streaming control plane (desktop default: reqwest)
//! - `SettingsStore` - Preferred provider lookup (desktop default: JSON file)
//! - `PlayEventRecorder` - Play history (default: no-op)
//! - `Clock` - Timestamps (default: system clock)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `HttpClient` and `SettingsStore` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, SessionConfig};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .script_loader(Arc::new(WebviewScriptLoader::new(webview.clone())))
//!     .streaming_engine(Arc::new(WebviewSpotifyEngine::new(webview.clone())))
//!     .video_engine(Arc::new(WebviewYouTubeEngine::new(webview)))
//!     .token_provider(Arc::new(MyTokenService))
//!     .session(SessionConfig::new("user-123"))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! The builder validates all required dependencies and provides actionable error
//! messages when capabilities are missing:
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No script loader and no engines
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    AccessTokenProvider, Clock, HttpClient, NoopRecorder, PlayEventRecorder, ScriptLoader,
    SettingsStore, StreamingEngine, SystemClock, VideoEngine,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Settings key holding the user's preferred provider.
pub const DEFAULT_PREFERRED_PROVIDER_KEY: &str = "playback.preferred_provider";

/// Default capacity of the event bus.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

const MAX_EVENT_BUFFER_SIZE: usize = 10_000;
const MAX_UNMUTE_DELAY: Duration = Duration::from_secs(2);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);
const MAX_TEARDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Core configuration for the playback core.
///
/// This struct holds all dependencies and settings required to initialize
/// the orchestrator. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Script loader for vendor SDKs (required)
    pub script_loader: Arc<dyn ScriptLoader>,

    /// Streaming-audio engine (optional, but one engine is required)
    pub streaming_engine: Option<Arc<dyn StreamingEngine>>,

    /// Video engine (optional, but one engine is required)
    pub video_engine: Option<Arc<dyn VideoEngine>>,

    /// Streaming provider credentials (required with a streaming engine)
    pub token_provider: Option<Arc<dyn AccessTokenProvider>>,

    /// HTTP client for the streaming control plane
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Persisted preferences
    pub settings_store: Arc<dyn SettingsStore>,

    /// Play history collaborator
    pub event_recorder: Arc<dyn PlayEventRecorder>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    /// Who is listening, and how the local device is named
    pub session: SessionConfig,

    /// Delays and timeouts used by the adapters and the orchestrator
    pub timings: EngineTimings,

    /// Feature flags
    pub features: FeatureFlags,

    /// Settings key holding the preferred provider
    pub preferred_provider_key: String,

    /// Capacity of the broadcast event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("script_loader", &"ScriptLoader { ... }")
            .field(
                "streaming_engine",
                &self
                    .streaming_engine
                    .as_ref()
                    .map(|_| "StreamingEngine { ... }"),
            )
            .field(
                "video_engine",
                &self.video_engine.as_ref().map(|_| "VideoEngine { ... }"),
            )
            .field(
                "token_provider",
                &self
                    .token_provider
                    .as_ref()
                    .map(|_| "AccessTokenProvider { ... }"),
            )
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("session", &self.session)
            .field("timings", &self.timings)
            .field("features", &self.features)
            .field("preferred_provider_key", &self.preferred_provider_key)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

/// Listening session identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Application user id, passed to the token provider.
    pub user_id: String,

    /// Device name announced to the streaming backend.
    pub player_name: String,
}

impl SessionConfig {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }

    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            player_name: "Duet Web Player".to_string(),
        }
    }
}

/// Delays and timeouts for engine interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTimings {
    /// Delay between a muted programmatic start and the unmute.
    ///
    /// Browsers accept a muted autoplay; 100-200 ms later the unmute is
    /// allowed because playback is already running.
    pub unmute_delay: Duration,

    /// Delay before the single retry of a rejected seek.
    pub seek_retry_delay: Duration,

    /// Delay before the single retry of a failed device handoff.
    pub handoff_retry_delay: Duration,

    /// Upper bound on waiting for the previous engine to pause and tear down
    /// during a provider switch.
    pub teardown_timeout: Duration,
}

impl Default for EngineTimings {
    fn default() -> Self {
        Self {
            unmute_delay: Duration::from_millis(150),
            seek_retry_delay: Duration::from_millis(500),
            handoff_retry_delay: Duration::from_millis(300),
            teardown_timeout: Duration::from_secs(3),
        }
    }
}

impl EngineTimings {
    /// Validates that every delay is within a usable range.
    pub fn validate(&self) -> Result<()> {
        if self.unmute_delay > MAX_UNMUTE_DELAY {
            return Err(Error::Config(format!(
                "Unmute delay of {}ms exceeds maximum of {}ms",
                self.unmute_delay.as_millis(),
                MAX_UNMUTE_DELAY.as_millis()
            )));
        }

        if self.seek_retry_delay.is_zero() || self.seek_retry_delay > MAX_RETRY_DELAY {
            return Err(Error::Config(
                "Seek retry delay must be between 1ms and 10s".to_string(),
            ));
        }

        if self.handoff_retry_delay > MAX_RETRY_DELAY {
            return Err(Error::Config(
                "Handoff retry delay exceeds maximum of 10s".to_string(),
            ));
        }

        if self.teardown_timeout.is_zero() || self.teardown_timeout > MAX_TEARDOWN_TIMEOUT {
            return Err(Error::Config(
                "Teardown timeout must be between 1ms and 30s".to_string(),
            ));
        }

        Ok(())
    }
}

/// Feature flags control optional behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Start programmatic playback muted and unmute shortly after
    pub autoplay_workaround: bool,

    /// Advance to the next queue entry when a track ends
    pub auto_advance: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            autoplay_workaround: true,
            auto_advance: true,
        }
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - At least one engine is provided
    /// - A streaming engine comes with credentials, an HTTP client and a user id
    /// - Timings, buffer size and the preference key are usable
    pub fn validate(&self) -> Result<()> {
        if self.streaming_engine.is_none() && self.video_engine.is_none() {
            return Err(Error::CapabilityMissing {
                capability: "PlaybackEngine".to_string(),
                message: "At least one playback engine is required. \
                         Inject a StreamingEngine, a VideoEngine, or both."
                    .to_string(),
            });
        }

        if self.streaming_engine.is_some() {
            if self.token_provider.is_none() {
                return Err(Error::CapabilityMissing {
                    capability: "AccessTokenProvider".to_string(),
                    message: "A StreamingEngine requires an AccessTokenProvider. \
                             Inject the host's token service or remove the streaming engine."
                        .to_string(),
                });
            }

            if self.http_client.is_none() {
                return Err(http_client_missing_error());
            }

            if self.session.user_id.trim().is_empty() {
                return Err(Error::Config(
                    "Session user id is required when a streaming engine is configured"
                        .to_string(),
                ));
            }
        }

        if self.session.player_name.trim().is_empty() {
            return Err(Error::Config("Player name cannot be empty".to_string()));
        }

        self.timings.validate()?;

        if self.preferred_provider_key.trim().is_empty() {
            return Err(Error::Config(
                "Preferred provider settings key cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER_SIZE
            )));
        }

        Ok(())
    }
}

fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for the streaming control plane. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Mobile/Web: inject the platform HTTP adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required for the preferred provider. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default FileSettingsStore. \
                 Mobile: inject platform-native settings (UserDefaults/DataStore). \
                 Web: inject localStorage-based settings store."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
    })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_settings_store(path: Option<PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::FileSettingsStore;
    use std::thread;

    let path = match path {
        Some(path) => path,
        None => FileSettingsStore::default_path().map_err(|e| {
            Error::Internal(format!("No location for default SettingsStore: {}", e))
        })?,
    };

    // The store opens asynchronously; build it on a private runtime so this
    // works both inside and outside an existing tokio context.
    let init_store = move || -> Result<FileSettingsStore> {
        core_async::runtime::block_on(FileSettingsStore::open(path))
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create runtime for default settings store: {}",
                    e
                ))
            })?
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
            })
    };

    let store = thread::spawn(init_store).join().map_err(|_| {
        Error::Internal("Worker thread panicked while creating default SettingsStore".to_string())
    })??;

    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_settings_store(_path: Option<PathBuf>) -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    script_loader: Option<Arc<dyn ScriptLoader>>,
    streaming_engine: Option<Arc<dyn StreamingEngine>>,
    video_engine: Option<Arc<dyn VideoEngine>>,
    token_provider: Option<Arc<dyn AccessTokenProvider>>,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    settings_path: Option<PathBuf>,
    event_recorder: Option<Arc<dyn PlayEventRecorder>>,
    clock: Option<Arc<dyn Clock>>,
    session: SessionConfig,
    timings: EngineTimings,
    features: FeatureFlags,
    preferred_provider_key: Option<String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the SDK script loader (required).
    pub fn script_loader(mut self, loader: Arc<dyn ScriptLoader>) -> Self {
        self.script_loader = Some(loader);
        self
    }

    /// Sets the streaming-audio engine bridge.
    pub fn streaming_engine(mut self, engine: Arc<dyn StreamingEngine>) -> Self {
        self.streaming_engine = Some(engine);
        self
    }

    /// Sets the video engine bridge.
    pub fn video_engine(mut self, engine: Arc<dyn VideoEngine>) -> Self {
        self.video_engine = Some(engine);
        self
    }

    /// Sets the streaming provider token source.
    pub fn token_provider(mut self, provider: Arc<dyn AccessTokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided and a streaming engine is configured, the desktop
    /// default (reqwest-based) is used when the `desktop-shims` feature is
    /// enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the settings store implementation.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Location of the desktop default settings file. Ignored when a
    /// settings store is injected.
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Sets the play history collaborator. Defaults to a no-op recorder.
    pub fn event_recorder(mut self, recorder: Arc<dyn PlayEventRecorder>) -> Self {
        self.event_recorder = Some(recorder);
        self
    }

    /// Sets the time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn session(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    pub fn timings(mut self, timings: EngineTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn unmute_delay(mut self, delay: Duration) -> Self {
        self.timings.unmute_delay = delay;
        self
    }

    pub fn teardown_timeout(mut self, timeout: Duration) -> Self {
        self.timings.teardown_timeout = timeout;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Enables or disables the muted-start autoplay workaround.
    ///
    /// Default: true
    pub fn enable_autoplay_workaround(mut self, enabled: bool) -> Self {
        self.features.autoplay_workaround = enabled;
        self
    }

    /// Enables or disables advancing the queue when a track ends.
    ///
    /// Default: true
    pub fn enable_auto_advance(mut self, enabled: bool) -> Self {
        self.features.auto_advance = enabled;
        self
    }

    /// Overrides the settings key of the preferred provider.
    ///
    /// Default: `playback.preferred_provider`
    pub fn preferred_provider_key(mut self, key: impl Into<String>) -> Self {
        self.preferred_provider_key = Some(key.into());
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The script loader or every engine is missing
    /// - A streaming engine lacks credentials or an HTTP client
    /// - Configuration values are out of range
    pub fn build(self) -> Result<CoreConfig> {
        let script_loader = self.script_loader.ok_or_else(|| Error::CapabilityMissing {
            capability: "ScriptLoader".to_string(),
            message: "A ScriptLoader is required to load the vendor SDKs. \
                     Inject the webview or native SDK loader of the host."
                .to_string(),
        })?;

        let http_client = match (self.http_client, &self.streaming_engine) {
            (Some(client), _) => Some(client),
            (None, Some(_)) => Some(provide_default_http_client()?),
            (None, None) => None,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.settings_path)?,
        };

        let config = CoreConfig {
            script_loader,
            streaming_engine: self.streaming_engine,
            video_engine: self.video_engine,
            token_provider: self.token_provider,
            http_client,
            settings_store,
            event_recorder: self
                .event_recorder
                .unwrap_or_else(|| Arc::new(NoopRecorder)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            session: self.session,
            timings: self.timings,
            features: self.features,
            preferred_provider_key: self
                .preferred_provider_key
                .unwrap_or_else(|| DEFAULT_PREFERRED_PROVIDER_KEY.to_string()),
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{
        BridgeError, HttpRequest, HttpResponse, ScriptSource, StaticTokenProvider,
        StreamingConnectOptions, VideoPlayerOptions,
    };

    type BridgeResult<T> = std::result::Result<T, BridgeError>;

    struct NullLoader;

    #[async_trait]
    impl ScriptLoader for NullLoader {
        async fn load(&self, _source: &ScriptSource) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullStreaming;

    #[async_trait]
    impl StreamingEngine for NullStreaming {
        async fn connect(&self, _options: StreamingConnectOptions) -> BridgeResult<()> {
            Ok(())
        }
        async fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn resume(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn seek(&self, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }
        async fn set_volume(&self, _level: f32) -> BridgeResult<()> {
            Ok(())
        }
        async fn disconnect(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullVideo;

    #[async_trait]
    impl VideoEngine for NullVideo {
        async fn create_player(&self, _options: VideoPlayerOptions) -> BridgeResult<()> {
            Ok(())
        }
        async fn load_video(&self, _id: &str, _start: Option<Duration>) -> BridgeResult<()> {
            Ok(())
        }
        async fn cue_video(&self, _id: &str, _start: Option<Duration>) -> BridgeResult<()> {
            Ok(())
        }
        async fn play(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn seek_to(&self, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }
        async fn set_volume(&self, _percent: u8) -> BridgeResult<()> {
            Ok(())
        }
        async fn mute(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn unmute(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn destroy(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullHttp;

    #[async_trait]
    impl HttpClient for NullHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::NotAvailable("offline".to_string()))
        }
    }

    struct NullSettings;

    #[async_trait]
    impl SettingsStore for NullSettings {
        async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
            Ok(None)
        }
        async fn delete(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn video_only() -> CoreConfigBuilder {
        CoreConfig::builder()
            .script_loader(Arc::new(NullLoader))
            .video_engine(Arc::new(NullVideo))
            .settings_store(Arc::new(NullSettings))
    }

    fn with_streaming() -> CoreConfigBuilder {
        video_only()
            .streaming_engine(Arc::new(NullStreaming))
            .token_provider(Arc::new(StaticTokenProvider::new("token")))
            .http_client(Arc::new(NullHttp))
            .session(SessionConfig::new("user-1"))
    }

    #[test]
    fn test_builder_requires_script_loader() {
        let result = CoreConfig::builder()
            .video_engine(Arc::new(NullVideo))
            .settings_store(Arc::new(NullSettings))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "ScriptLoader")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_requires_an_engine() {
        let result = CoreConfig::builder()
            .script_loader(Arc::new(NullLoader))
            .settings_store(Arc::new(NullSettings))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "PlaybackEngine")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_streaming_engine_requires_token_provider() {
        let result = video_only()
            .streaming_engine(Arc::new(NullStreaming))
            .http_client(Arc::new(NullHttp))
            .session(SessionConfig::new("user-1"))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "AccessTokenProvider")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_streaming_engine_requires_user_id() {
        let result = with_streaming().session(SessionConfig::default()).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_video_only_config_has_defaults() {
        let config = video_only().build().unwrap();

        assert!(config.streaming_engine.is_none());
        assert!(config.http_client.is_none());
        assert_eq!(config.preferred_provider_key, DEFAULT_PREFERRED_PROVIDER_KEY);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.timings, EngineTimings::default());
        assert_eq!(config.features, FeatureFlags::default());
        assert_eq!(config.session.player_name, "Duet Web Player");
    }

    #[test]
    fn test_full_config_builds() {
        let config = with_streaming()
            .enable_auto_advance(false)
            .preferred_provider_key("prefs.provider")
            .event_buffer_size(16)
            .build()
            .unwrap();

        assert!(config.streaming_engine.is_some());
        assert!(!config.features.auto_advance);
        assert!(config.features.autoplay_workaround);
        assert_eq!(config.preferred_provider_key, "prefs.provider");
        assert_eq!(config.event_buffer_size, 16);
    }

    #[test]
    fn test_validate_rejects_long_unmute_delay() {
        let result = video_only().unmute_delay(Duration::from_secs(5)).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_teardown_timeout() {
        let result = video_only().teardown_timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let result = video_only().event_buffer_size(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_preference_key() {
        let result = video_only().preferred_provider_key("  ").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = video_only().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("VideoEngine { ... }"));
        assert!(rendered.contains("event_buffer_size: 100"));
    }

    #[test]
    fn test_config_is_cloneable() {
        let config = video_only().build().unwrap();
        let cloned = config.clone();
        assert_eq!(config.session, cloned.session);
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_desktop_defaults_fill_settings_and_http() {
        let dir = std::env::temp_dir().join(format!("core-runtime-test-{}", uuid::Uuid::new_v4()));
        let config = CoreConfig::builder()
            .script_loader(Arc::new(NullLoader))
            .streaming_engine(Arc::new(NullStreaming))
            .token_provider(Arc::new(StaticTokenProvider::new("token")))
            .session(SessionConfig::new("user-1"))
            .settings_path(dir.join("settings.json"))
            .build()
            .expect("desktop defaults should succeed");

        assert!(config.http_client.is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_desktop_defaults_inside_runtime() {
        let dir = std::env::temp_dir().join(format!("core-runtime-test-{}", uuid::Uuid::new_v4()));
        let config = CoreConfig::builder()
            .script_loader(Arc::new(NullLoader))
            .video_engine(Arc::new(NullVideo))
            .settings_path(dir.join("settings.json"))
            .build()
            .expect("desktop defaults should succeed inside runtime");

        config
            .settings_store
            .set_string(DEFAULT_PREFERRED_PROVIDER_KEY, "youtube")
            .await
            .unwrap();
        assert_eq!(
            config
                .settings_store
                .get_string(DEFAULT_PREFERRED_PROVIDER_KEY)
                .await
                .unwrap()
                .as_deref(),
            Some("youtube")
        );
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
