//! Settings storage backed by a JSON file

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use core_async::sync::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "duet";

/// File-backed settings store.
///
/// The whole map is kept in memory and rewritten on every change. Writes go
/// to a sibling temp file first and are renamed into place.
pub struct FileSettingsStore {
    path: Option<PathBuf>,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSettingsStore {
    /// Open (or create) the store at `path`.
    ///
    /// A corrupt file is logged and treated as empty rather than failing
    /// startup.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let values = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Ignoring unreadable settings file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        debug!(path = ?path, entries = values.len(), "Initialized settings store");

        Ok(Self {
            path: Some(path),
            values: Mutex::new(values),
        })
    }

    /// Open the store in the platform config directory.
    pub async fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?).await
    }

    /// Store that never touches the disk (for testing).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
            .ok_or_else(|| {
                BridgeError::NotAvailable("No configuration directory on this platform".into())
            })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_vec_pretty(values).map_err(|e| {
            BridgeError::OperationFailed(format!("Failed to encode settings: {}", e))
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for FileSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values).await?;
        debug!(key = key, "Stored setting");
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().await;
        if values.remove(key).is_some() {
            self.persist(&values).await?;
        }
        Ok(())
    }
}
