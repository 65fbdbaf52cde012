//! Settings Storage Abstraction
//!
//! Key-value preferences persisted by the host (UserDefaults, DataStore,
//! localStorage, a JSON file on desktop). The playback core only reads from
//! it; writes belong to settings screens outside the core.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value settings storage trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn preferred(store: &dyn SettingsStore) -> Result<Option<String>> {
///     store.get_string("playback.preferred_provider").await
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_string(key, if value { "true" } else { "false" })
            .await
    }

    /// Retrieve a boolean value; unparseable values read as absent
    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        Ok(self
            .get_string(key)
            .await?
            .and_then(|value| value.parse::<bool>().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        values: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SettingsStore for MapStore {
        async fn set_string(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_bool_helpers_round_through_strings() {
        let store = MapStore::default();
        store.set_bool("autoplay", true).await.unwrap();

        assert_eq!(store.get_string("autoplay").await.unwrap().as_deref(), Some("true"));
        assert_eq!(store.get_bool("autoplay").await.unwrap(), Some(true));

        store.set_string("autoplay", "maybe").await.unwrap();
        assert_eq!(store.get_bool("autoplay").await.unwrap(), None);
    }
}
