// Модуль хранилища
//
// Универсальный key-value кеш с ленивым истечением: просроченная запись
// вычищается при чтении, фонового sweeper'а нет. Записи конкурентов не
// координируются — last-write-wins.

pub mod file;
pub mod memory;
pub mod session_keys;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session_keys::SessionKeyStore;

use crate::error::Result;
use crate::utils::time::current_timestamp_ms;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Запись кеша: значение плюс необязательный момент истечения (Unix ms)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<u64>,
}

impl CacheEntry {
    pub fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expire_at: ttl.map(|t| current_timestamp_ms() + t.as_millis() as u64),
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expire_at, Some(at) if current_timestamp_ms() > at)
    }
}

/// Долговременное key-value хранилище
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Прочитать значение; просроченная запись лениво вычищается и дает `None`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn remove(&self, key: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;

    async fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
