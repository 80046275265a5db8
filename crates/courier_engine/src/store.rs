use std::collections::{BTreeMap, HashMap};
use std::io;

use courier_core::SettingChange;
use thiserror::Error;
use tokio::sync::{broadcast, RwLock};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings file could not be read or written: {0}")]
    Io(#[from] io::Error),
    #[error("settings could not be parsed: {0}")]
    Parse(String),
    #[error("settings could not be serialized: {0}")]
    Serialize(String),
}

/// Durable key-value settings with change notification.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the present values among `keys`; absent keys are simply missing.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, StoreError>;

    /// Writes all entries and broadcasts the ones whose value changed.
    async fn set(&self, entries: Vec<(String, String)>) -> Result<(), StoreError>;

    /// Receives one batch per effective `set`.
    fn subscribe(&self) -> broadcast::Receiver<Vec<SettingChange>>;
}

/// In-memory store; also the cache underneath file-backed stores.
#[derive(Debug)]
pub struct MemoryConfigStore {
    values: RwLock<BTreeMap<String, String>>,
    changes: broadcast::Sender<Vec<SettingChange>>,
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::with_values(std::iter::empty::<(String, String)>())
    }
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: RwLock::new(
                values
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            changes,
        }
    }

    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.values.read().await.clone()
    }

    /// Applies entries and returns what changed, without broadcasting.
    pub async fn apply(&self, entries: Vec<(String, String)>) -> Vec<SettingChange> {
        let mut values = self.values.write().await;
        let mut changed = Vec::new();
        for (key, value) in entries {
            if values.get(&key) == Some(&value) {
                continue;
            }
            values.insert(key.clone(), value.clone());
            changed.push(SettingChange::new(key, Some(value)));
        }
        changed
    }

    pub fn broadcast(&self, changed: Vec<SettingChange>) {
        if !changed.is_empty() {
            // No subscribers is fine; nobody is listening yet.
            let _ = self.changes.send(changed);
        }
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, StoreError> {
        let values = self.values.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        let changed = self.apply(entries).await;
        self.broadcast(changed);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Vec<SettingChange>> {
        self.changes.subscribe()
    }
}
