//! # Engine Bootstrapper
//!
//! Loads a vendor SDK exactly once. The in-flight load itself is memoized,
//! so concurrent first users all await the same future instead of
//! injecting the script twice. A failed load is forgotten so a later
//! attempt can try again.

use std::fmt;
use std::sync::Arc;

use bridge_traits::{ScriptLoader, ScriptSource};
use core_async::sync::watch;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::BootstrapError;
use crate::types::ProviderKind;

type LoadFuture = Shared<BoxFuture<'static, Result<(), BootstrapError>>>;

pub struct EngineBootstrapper {
    provider: ProviderKind,
    source: ScriptSource,
    loader: Arc<dyn ScriptLoader>,
    inflight: Mutex<Option<LoadFuture>>,
    ready: watch::Sender<bool>,
}

impl EngineBootstrapper {
    pub fn new(provider: ProviderKind, source: ScriptSource, loader: Arc<dyn ScriptLoader>) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            provider,
            source,
            loader,
            inflight: Mutex::new(None),
            ready,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn source(&self) -> &ScriptSource {
        &self.source
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Receiver that flips to `true` once the SDK has loaded.
    pub fn ready(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }

    /// Load the SDK, or join the load already in progress.
    pub async fn ensure_loaded(&self) -> Result<(), BootstrapError> {
        if self.is_ready() {
            return Ok(());
        }

        let load = {
            let mut inflight = self.inflight.lock();
            match inflight.as_ref() {
                Some(load) => {
                    debug!(provider = %self.provider, "Joining in-flight SDK load");
                    load.clone()
                }
                None => {
                    info!(provider = %self.provider, url = %self.source.url, "Loading SDK");
                    let load = self.start_load();
                    *inflight = Some(load.clone());
                    load
                }
            }
        };

        let result = load.clone().await;
        match &result {
            Ok(()) => {
                self.ready.send_replace(true);
            }
            Err(e) => {
                warn!(provider = %self.provider, error = %e, "SDK load failed");
                let mut inflight = self.inflight.lock();
                if inflight.as_ref().is_some_and(|current| current.ptr_eq(&load)) {
                    *inflight = None;
                }
            }
        }
        result
    }

    fn start_load(&self) -> LoadFuture {
        let loader = Arc::clone(&self.loader);
        let source = self.source.clone();
        let provider = self.provider;
        async move {
            loader
                .load(&source)
                .await
                .map_err(|e| BootstrapError {
                    provider,
                    message: e.to_string(),
                })
        }
        .boxed()
        .shared()
    }
}

impl fmt::Debug for EngineBootstrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBootstrapper")
            .field("provider", &self.provider)
            .field("source", &self.source)
            .field("ready", &self.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::BridgeError;
    use core_async::time::{sleep, Duration};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLoader {
        calls: AtomicUsize,
        fail_first: bool,
    }

    impl CountingLoader {
        fn new(fail_first: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail_first,
            })
        }
    }

    #[async_trait]
    impl ScriptLoader for CountingLoader {
        async fn load(&self, _source: &ScriptSource) -> bridge_traits::error::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(50)).await;
            if self.fail_first && call == 0 {
                Err(BridgeError::OperationFailed("network".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_loads_inject_once() {
        let loader = CountingLoader::new(false);
        let bootstrapper = Arc::new(EngineBootstrapper::new(
            ProviderKind::YouTube,
            ScriptSource::youtube_iframe_api(),
            loader.clone(),
        ));
        let mut ready = bootstrapper.ready();

        let a = bootstrapper.clone();
        let b = bootstrapper.clone();
        let (first, second) = tokio::join!(a.ensure_loaded(), b.ensure_loaded());

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
        assert!(bootstrapper.is_ready());
        assert!(*ready.borrow_and_update());

        bootstrapper.ensure_loaded().await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_can_be_retried() {
        let loader = CountingLoader::new(true);
        let bootstrapper = EngineBootstrapper::new(
            ProviderKind::Spotify,
            ScriptSource::spotify_web_playback(),
            loader.clone(),
        );

        let error = bootstrapper.ensure_loaded().await.unwrap_err();
        assert_eq!(error.provider, ProviderKind::Spotify);
        assert!(!bootstrapper.is_ready());

        bootstrapper.ensure_loaded().await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
        assert!(bootstrapper.is_ready());
    }
}
