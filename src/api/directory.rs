// Каталог публичных ключей
//
// Внешний eventually-consistent key-value сервис: identity -> публичный
// ключ. Отсутствующая или устаревшая запись — восстановимое состояние,
// не фатальная ошибка.

use crate::error::{CardSealError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Текущий зарегистрированный публичный ключ identity, если есть
    async fn get_public_key(&self, identity: &str) -> Result<Option<String>>;

    /// Зарегистрировать/обновить публичный ключ identity
    async fn register_public_key(&self, identity: &str, public_key: &str) -> Result<()>;
}

// Каталог обычно один на приложение и разделяется между компонентами
#[async_trait]
impl<T: IdentityDirectory + ?Sized> IdentityDirectory for Arc<T> {
    async fn get_public_key(&self, identity: &str) -> Result<Option<String>> {
        (**self).get_public_key(identity).await
    }

    async fn register_public_key(&self, identity: &str, public_key: &str) -> Result<()> {
        (**self).register_public_key(identity, public_key).await
    }
}

/// In-memory каталог для композиции и тестов
#[derive(Default)]
pub struct InMemoryDirectory {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryDirectory {
    async fn get_public_key(&self, identity: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CardSealError::StorageFailed("Directory lock poisoned".to_string()))?;
        Ok(entries.get(identity).cloned())
    }

    async fn register_public_key(&self, identity: &str, public_key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CardSealError::StorageFailed("Directory lock poisoned".to_string()))?;
        entries.insert(identity.to_string(), public_key.to_string());
        Ok(())
    }
}
