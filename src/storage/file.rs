// Долговременное хранилище в JSON-файле
//
// Переживает перезапуск процесса: каждая мутация сериализует всю карту
// на диск. Нечитаемый файл или запись дают пустое состояние / eviction,
// а не ошибку — кеш обязан деградировать тихо.

use crate::error::{CardSealError, Result};
use crate::storage::{CacheEntry, KvStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

/// Файловая реализация [`KvStore`]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl FileStore {
    /// Открыть хранилище; существующий файл подхватывается, испорченный —
    /// отбрасывается с предупреждением
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cache file is corrupt, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    async fn persist(&self, entries: &HashMap<String, CacheEntry>) -> Result<()> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| CardSealError::SerializationFailed(e.to_string()))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| CardSealError::StorageFailed(e.to_string()))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), CacheEntry::new(value, ttl));
        self.persist(&entries).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                self.persist(&entries).await?;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if entries.remove(key).is_some() {
            self.persist(&entries).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.persist(&entries).await
    }
}
