// Хранилище сессионных ключей
//
// Чистый lookup-коллаборатор без криптографической логики: отображение
// sessionId -> симметричный ключ (Base64) поверх любого KvStore.
// На один sessionId авторитетен ровно один ключ; конфликт разрешается
// как last-write-wins (несколько вкладок, общий кеш — известное
// ограничение, координации нет).

use crate::config::Config;
use crate::error::Result;
use crate::storage::KvStore;
use std::time::Duration;

pub struct SessionKeyStore<S: KvStore> {
    store: S,
}

impl<S: KvStore> SessionKeyStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn cache_key(session_id: &str) -> String {
        format!("{}{}", Config::global().session_key_prefix, session_id)
    }

    pub async fn set(&self, session_id: &str, key_b64: &str, ttl: Option<Duration>) -> Result<()> {
        self.store.set(&Self::cache_key(session_id), key_b64, ttl).await
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<String>> {
        self.store.get(&Self::cache_key(session_id)).await
    }

    pub async fn remove(&self, session_id: &str) -> Result<()> {
        self.store.remove(&Self::cache_key(session_id)).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await
    }
}
