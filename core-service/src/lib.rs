//! Core service façade and bootstrap helpers.
//!
//! This crate wires a validated [`CoreConfig`] into a running playback core:
//! it registers the provider adapters whose engine bridges the host supplied,
//! builds the [`PlaybackOrchestrator`], and drives the adapter notification
//! pump on the async runtime. Hosts route vendor SDK callbacks back in with
//! [`PlaybackService::dispatch_engine_signal`].
//!
//! Desktop apps typically enable the `desktop-shims` feature (which depends
//! on `bridge-desktop`) so the HTTP client and settings store default to
//! reqwest and a JSON file.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::EngineSignal;
use core_async::sync::{CancellationToken, Mutex};
use core_async::task::{spawn, JoinHandle};
use core_playback::{OrchestratorBuilder, OrchestratorConfig, PlaybackOrchestrator, ProviderKind};
use core_runtime::config::CoreConfig;
use tracing::{debug, info, instrument, warn};

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop::{FileSettingsStore, ReqwestHttpClient};
pub use core_playback;
pub use core_runtime;

/// Primary façade exposed to host applications.
pub struct PlaybackService {
    orchestrator: Arc<PlaybackOrchestrator>,
    shutdown: CancellationToken,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackService {
    /// Build the orchestrator from `config` and start the notification pump.
    ///
    /// Must be called from within the async runtime.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let builder = PlaybackOrchestrator::builder(OrchestratorConfig::from_core(&config));
        let builder = register_spotify(builder, &config)?;
        let builder = register_youtube(builder, &config)?;
        let (orchestrator, notifications) = builder.build();

        let registered = orchestrator.registry().registered();
        if !registered.iter().any(|(_, enabled)| *enabled) {
            return Err(CoreError::InitializationFailed(
                "no playback provider could be registered with the configured engines"
                    .to_string(),
            ));
        }

        let orchestrator = Arc::new(orchestrator);
        let shutdown = CancellationToken::new();
        let pump = {
            let orchestrator = Arc::clone(&orchestrator);
            let shutdown = shutdown.clone();
            spawn(async move {
                orchestrator.run_notifications(notifications, shutdown).await;
            })
        };

        info!(
            spotify = registered[ProviderKind::Spotify],
            youtube = registered[ProviderKind::YouTube],
            "Playback service started"
        );
        Ok(Self {
            orchestrator,
            shutdown,
            pump: Mutex::new(Some(pump)),
        })
    }

    /// The orchestrator behind this service.
    pub fn orchestrator(&self) -> &Arc<PlaybackOrchestrator> {
        &self.orchestrator
    }

    /// Route a vendor SDK callback to the adapter owning that engine.
    ///
    /// Signals for an engine that was never created are dropped.
    #[instrument(skip(self, signal), fields(signal = signal.name()))]
    pub async fn dispatch_engine_signal(
        &self,
        provider: ProviderKind,
        signal: EngineSignal,
    ) -> Result<()> {
        match self.orchestrator.registry().get(provider) {
            Some(adapter) => {
                adapter.handle_signal(signal).await;
            }
            None => debug!(provider = %provider, "Dropping signal for an engine never created"),
        }
        Ok(())
    }

    /// [`dispatch_engine_signal`](Self::dispatch_engine_signal) for hosts
    /// that identify engines by name (`"spotify"`, `"youtube"`).
    pub async fn dispatch_engine_signal_named(
        &self,
        provider: &str,
        signal: EngineSignal,
    ) -> Result<()> {
        let provider: ProviderKind = provider.parse()?;
        self.dispatch_engine_signal(provider, signal).await
    }

    /// End the session: stop the pump and tear down every created engine.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown.cancel();
        if let Some(pump) = self.pump.lock().await.take() {
            if let Err(e) = pump.await {
                warn!(error = %e, "Notification pump ended abnormally");
            }
        }
        self.orchestrator.shutdown().await?;
        info!("Playback service shut down");
        Ok(())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(feature = "spotify")]
fn register_spotify(builder: OrchestratorBuilder, config: &CoreConfig) -> Result<OrchestratorBuilder> {
    let Some(engine) = config.streaming_engine.clone() else {
        return Ok(builder);
    };
    let token_provider = config.token_provider.clone().ok_or_else(|| {
        CoreError::missing(
            "AccessTokenProvider",
            "The streaming engine needs an access token source",
        )
    })?;
    let http_client = config.http_client.clone().ok_or_else(|| {
        CoreError::missing(
            "HttpClient",
            "The streaming engine needs an HTTP client for device handoff",
        )
    })?;

    let bridges = provider_spotify::SpotifyBridges {
        engine,
        script_loader: Arc::clone(&config.script_loader),
        token_provider,
        http_client,
        session: config.session.clone(),
    };
    Ok(builder.adapter_factory(
        ProviderKind::Spotify,
        provider_spotify::adapter_factory(bridges),
    ))
}

#[cfg(not(feature = "spotify"))]
fn register_spotify(builder: OrchestratorBuilder, config: &CoreConfig) -> Result<OrchestratorBuilder> {
    if config.streaming_engine.is_some() {
        warn!("Streaming engine configured but the `spotify` feature is disabled");
    }
    Ok(builder)
}

#[cfg(feature = "youtube")]
fn register_youtube(builder: OrchestratorBuilder, config: &CoreConfig) -> Result<OrchestratorBuilder> {
    let Some(engine) = config.video_engine.clone() else {
        return Ok(builder);
    };
    let bridges = provider_youtube::YouTubeBridges {
        engine,
        script_loader: Arc::clone(&config.script_loader),
    };
    Ok(builder.adapter_factory(
        ProviderKind::YouTube,
        provider_youtube::adapter_factory(bridges),
    ))
}

#[cfg(not(feature = "youtube"))]
fn register_youtube(builder: OrchestratorBuilder, config: &CoreConfig) -> Result<OrchestratorBuilder> {
    if config.video_engine.is_some() {
        warn!("Video engine configured but the `youtube` feature is disabled");
    }
    Ok(builder)
}
