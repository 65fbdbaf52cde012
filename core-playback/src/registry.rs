//! # Adapter Registry
//!
//! Lazily created, process-lifetime adapter singletons keyed by provider.
//! Vendor players are expensive to re-create, so an adapter is built on
//! first use and reused for every later track on that provider.

use std::fmt;
use std::sync::Arc;

use core_runtime::config::{EngineTimings, FeatureFlags};
use core_runtime::events::EventBus;
use parking_lot::Mutex;
use tracing::info;

use crate::adapter::{AdapterContext, AdapterNotifier, NotificationSender, ProviderAdapter};
use crate::error::{PlaybackError, Result};
use crate::types::{ProviderKind, ProviderMap};

/// Builds the adapter for one provider.
pub type AdapterFactory =
    Box<dyn Fn(AdapterContext) -> Result<Arc<dyn ProviderAdapter>> + Send + Sync>;

pub struct AdapterRegistry {
    factories: ProviderMap<Option<AdapterFactory>>,
    adapters: ProviderMap<Mutex<Option<Arc<dyn ProviderAdapter>>>>,
    notifications: NotificationSender,
    events: EventBus,
    timings: EngineTimings,
    features: FeatureFlags,
}

impl AdapterRegistry {
    pub fn new(
        notifications: NotificationSender,
        events: EventBus,
        timings: EngineTimings,
        features: FeatureFlags,
    ) -> Self {
        Self {
            factories: ProviderMap::default(),
            adapters: ProviderMap::default(),
            notifications,
            events,
            timings,
            features,
        }
    }

    pub fn register(&mut self, provider: ProviderKind, factory: AdapterFactory) {
        self.factories[provider] = Some(factory);
    }

    pub fn is_registered(&self, provider: ProviderKind) -> bool {
        self.factories[provider].is_some()
    }

    pub fn registered(&self) -> ProviderMap<bool> {
        ProviderMap::from_fn(|provider| self.is_registered(provider))
    }

    /// Existing adapter, without creating one.
    pub fn get(&self, provider: ProviderKind) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters[provider].lock().clone()
    }

    pub fn get_or_create(&self, provider: ProviderKind) -> Result<Arc<dyn ProviderAdapter>> {
        let mut slot = self.adapters[provider].lock();
        if let Some(adapter) = slot.as_ref() {
            return Ok(Arc::clone(adapter));
        }

        let factory = self.factories[provider]
            .as_ref()
            .ok_or(PlaybackError::NotConfigured(provider))?;
        let adapter = factory(self.context(provider))?;
        info!(provider = %provider, "Created provider adapter");
        *slot = Some(Arc::clone(&adapter));
        Ok(adapter)
    }

    /// Adapters built so far.
    pub fn created(&self) -> Vec<Arc<dyn ProviderAdapter>> {
        ProviderKind::ALL
            .into_iter()
            .filter_map(|provider| self.get(provider))
            .collect()
    }

    /// Whether the user has a usable session with `provider`. Builds the
    /// adapter if needed; unregistered providers have none.
    pub async fn session_available(&self, provider: ProviderKind) -> bool {
        match self.get_or_create(provider) {
            Ok(adapter) => adapter.session_active().await,
            Err(_) => false,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn context(&self, provider: ProviderKind) -> AdapterContext {
        AdapterContext {
            notifier: AdapterNotifier::new(provider, self.notifications.clone()),
            events: self.events.clone(),
            timings: self.timings,
            features: self.features,
        }
    }
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("registered", &self.registered())
            .field(
                "created",
                &ProviderMap::from_fn(|provider| self.get(provider).is_some()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{CueRequest, Delivery};
    use crate::lifecycle::EngineLifecycle;
    use async_trait::async_trait;
    use bridge_traits::EngineSignal;
    use core_async::sync::mpsc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct NullAdapter(ProviderKind);

    #[async_trait]
    impl ProviderAdapter for NullAdapter {
        fn provider(&self) -> ProviderKind {
            self.0
        }
        fn lifecycle(&self) -> EngineLifecycle {
            EngineLifecycle::Uninitialized
        }
        async fn cue(&self, _request: CueRequest) -> Result<Delivery> {
            Ok(Delivery::Buffered)
        }
        async fn play(&self, _start: Option<Duration>) -> Result<()> {
            Ok(())
        }
        async fn pause(&self) -> Result<()> {
            Ok(())
        }
        async fn seek_to(&self, _position: Duration) -> Result<Delivery> {
            Ok(Delivery::Buffered)
        }
        async fn set_volume(&self, _level: f32) -> Result<()> {
            Ok(())
        }
        async fn set_mute(&self, _muted: bool) -> Result<()> {
            Ok(())
        }
        async fn teardown(&self) {}
        async fn handle_signal(&self, _signal: EngineSignal) {}
    }

    fn registry() -> AdapterRegistry {
        let (tx, _rx) = mpsc::unbounded_channel();
        AdapterRegistry::new(
            tx,
            EventBus::new(8),
            EngineTimings::default(),
            FeatureFlags::default(),
        )
    }

    #[test]
    fn test_adapter_is_created_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let mut registry = registry();
        registry.register(
            ProviderKind::YouTube,
            Box::new(move |context| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(NullAdapter(context.provider())) as Arc<dyn ProviderAdapter>)
            }),
        );

        assert!(registry.get(ProviderKind::YouTube).is_none());
        let first = registry.get_or_create(ProviderKind::YouTube).unwrap();
        let second = registry.get_or_create(ProviderKind::YouTube).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(first.provider(), ProviderKind::YouTube);
        assert_eq!(registry.created().len(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_provider_is_not_configured() {
        let registry = registry();
        assert!(matches!(
            registry.get_or_create(ProviderKind::Spotify),
            Err(PlaybackError::NotConfigured(ProviderKind::Spotify))
        ));
        assert!(!registry.session_available(ProviderKind::Spotify).await);
    }
}
