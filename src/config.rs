//! Централизованная конфигурация CardSeal Core
//!
//! Все константы протокола определены здесь, чтобы избежать хардкода
//! по всему проекту.

use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // КРИПТОГРАФИЧЕСКИЕ ПАРАМЕТРЫ
    // ============================================
    /// Длина сессионного симметричного ключа (AES-128, в байтах)
    pub symmetric_key_length: usize,

    /// Длина nonce для AEAD (AES-GCM и ChaCha20-Poly1305, в байтах)
    pub aead_nonce_length: usize,

    /// Размер AEAD authentication tag (в байтах)
    pub aead_tag_length: usize,

    /// Размер публичного ключа X25519 (в байтах)
    pub public_key_length: usize,

    /// Асимметричный алгоритм по умолчанию для транспорта сессионного ключа
    pub default_algorithm: &'static str,

    // ============================================
    // ХРАНИЛИЩЕ
    // ============================================
    /// Префикс ключей кеша для сессионных ключей
    pub session_key_prefix: &'static str,

    /// TTL сессионного ключа в миллисекундах (None = без истечения)
    pub session_key_ttl_ms: Option<u64>,

    // ============================================
    // ВНЕШНИЕ СЕРВИСЫ
    // ============================================
    /// Таймаут обращения к token-сервису (в секундах), без retry
    pub token_timeout_secs: u64,
}

impl Config {
    /// Конфигурация со значениями по умолчанию
    pub fn standard() -> Self {
        Self {
            symmetric_key_length: 16,
            aead_nonce_length: 12,
            aead_tag_length: 16,
            public_key_length: 32,
            default_algorithm: "x25519",

            session_key_prefix: "session:",
            session_key_ttl_ms: None,

            token_timeout_secs: 5,
        }
    }

    /// Конфигурация из переменных окружения
    ///
    /// Переопределяются только операционные параметры; размеры ключей
    /// фиксированы протоколом.
    pub fn from_env() -> Self {
        let mut config = Self::standard();

        if let Ok(val) = std::env::var("CARDSEAL_SESSION_KEY_TTL_MS") {
            if let Ok(parsed) = val.parse() {
                config.session_key_ttl_ms = Some(parsed);
            }
        }

        if let Ok(val) = std::env::var("CARDSEAL_TOKEN_TIMEOUT_SECS") {
            if let Ok(parsed) = val.parse() {
                config.token_timeout_secs = parsed;
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// При первом вызове инициализируется значениями по умолчанию.
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::standard)
    }

    /// Инициализировать глобальную конфигурацию кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::standard()
    }
}
