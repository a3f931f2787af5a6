// Клиент token/signature-сервиса
//
// Внешний сервис обменивает короткоживущий authorization code на user
// access token и выдает параметры подписи JSAPI. Криптографическому ядру
// он не принадлежит: фиксированный таймаут 5 секунд, без retry, сбой
// немедленно отдается вызывающему.

use crate::config::Config;
use crate::error::{CardSealError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bearer-креденшелы пользователя от OAuth-подобного флоу платформы
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccessToken {
    pub access_token: String,
    pub open_id: String,
    pub expires_in: u64,
}

/// Параметры конфигурации JSAPI host SDK
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsapiSignature {
    pub app_id: String,
    pub timestamp: i64,
    pub nonce_str: String,
    pub signature: String,
}

/// Upstream-бэкенд обмена токенов
#[async_trait]
pub trait TokenBackend: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<UserAccessToken>;
    async fn jsapi_signature(&self, url: &str) -> Result<JsapiSignature>;
}

/// Обертка над бэкендом с таймаутом.
///
/// Таймаут — единственная гонка в ядре; криптопримитивы не оборачиваются.
pub struct TokenClient<B: TokenBackend> {
    backend: B,
    timeout: Duration,
}

impl<B: TokenBackend> TokenClient<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            timeout: Duration::from_secs(Config::global().token_timeout_secs),
        }
    }

    pub fn with_timeout(backend: B, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub async fn exchange_code(&self, code: &str) -> Result<UserAccessToken> {
        match tokio::time::timeout(self.timeout, self.backend.exchange_code(code)).await {
            Ok(result) => result,
            Err(_) => Err(CardSealError::TokenExchangeFailed(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    pub async fn jsapi_signature(&self, url: &str) -> Result<JsapiSignature> {
        match tokio::time::timeout(self.timeout, self.backend.jsapi_signature(url)).await {
            Ok(result) => result,
            Err(_) => Err(CardSealError::TokenExchangeFailed(format!(
                "timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}
