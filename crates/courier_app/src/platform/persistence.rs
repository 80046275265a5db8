use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use courier_core::SettingChange;
use courier_engine::{ConfigStore, MemoryConfigStore, StoreError};
use courier_logging::{courier_debug, courier_error, courier_info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::{broadcast, Mutex};

pub(crate) const SETTINGS_FILENAME: &str = "courier_settings.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSettings {
    values: BTreeMap<String, String>,
}

/// Settings kept in memory and mirrored to a ron file after every effective change.
pub(crate) struct FileConfigStore {
    path: PathBuf,
    cache: MemoryConfigStore,
    write_lock: Mutex<()>,
}

impl FileConfigStore {
    /// Loads `path`; a missing file starts empty.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let persisted = match fs::read_to_string(&path) {
            Ok(text) => ron::from_str::<PersistedSettings>(&text)
                .map_err(|err| StoreError::Parse(format!("{}: {}", path.display(), err)))?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                courier_info!("No settings at {:?}; starting unconfigured", path);
                PersistedSettings::default()
            }
            Err(err) => return Err(err.into()),
        };
        courier_debug!("Loaded {} setting(s) from {:?}", persisted.values.len(), path);

        Ok(Self {
            path,
            cache: MemoryConfigStore::with_values(persisted.values),
            write_lock: Mutex::new(()),
        })
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let state = PersistedSettings {
            values: self.cache.snapshot().await,
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&state, pretty)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        write_atomically(&self.path, &content)
    }
}

/// Writes a sibling temp file and renames it over `path`.
fn write_atomically(path: &Path, content: &str) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, StoreError> {
        self.cache.get(keys).await
    }

    async fn set(&self, entries: Vec<(String, String)>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let changed = self.cache.apply(entries).await;
        if changed.is_empty() {
            return Ok(());
        }
        if let Err(err) = self.persist().await {
            courier_error!("Failed to write settings to {:?}: {}", self.path, err);
            return Err(err);
        }
        self.cache.broadcast(changed);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Vec<SettingChange>> {
        self.cache.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{FileConfigStore, SETTINGS_FILENAME};
    use courier_core::settings::{API_HOST, API_PORT};
    use courier_engine::{ConfigStore, StoreError};

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::open(dir.path().join(SETTINGS_FILENAME)).unwrap();
        assert!(store.get(&[API_HOST]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);

        let store = FileConfigStore::open(&path).unwrap();
        store
            .set(vec![
                (API_HOST.to_string(), "nas.local".to_string()),
                (API_PORT.to_string(), "8080".to_string()),
            ])
            .await
            .unwrap();
        drop(store);

        let reopened = FileConfigStore::open(&path).unwrap();
        let values = reopened.get(&[API_HOST, API_PORT]).await.unwrap();
        assert_eq!(values.get(API_HOST).map(String::as_str), Some("nas.local"));
        assert_eq!(values.get(API_PORT).map(String::as_str), Some("8080"));
    }

    #[tokio::test]
    async fn unchanged_values_do_not_notify() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::open(dir.path().join(SETTINGS_FILENAME)).unwrap();
        store
            .set(vec![(API_HOST.to_string(), "nas.local".to_string())])
            .await
            .unwrap();

        let mut changes = store.subscribe();
        store
            .set(vec![(API_HOST.to_string(), "nas.local".to_string())])
            .await
            .unwrap();
        assert!(changes.try_recv().is_err());

        store
            .set(vec![(API_HOST.to_string(), "seedbox".to_string())])
            .await
            .unwrap();
        let batch = changes.recv().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].new_value.as_deref(), Some("seedbox"));
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, "values: [not ron").unwrap();

        let err = FileConfigStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
