// Типы ошибок ядра

use thiserror::Error;

/// Ошибки протокольного ядра.
///
/// Криптографические ошибки и ошибки поиска доходят до вызывающего кода
/// как типизированные варианты; ошибки разбора конвертов никогда сюда не
/// попадают — классификация деградирует до `Unclassified` (см. `protocol::envelope`).
#[derive(Error, Debug)]
pub enum CardSealError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Failed to generate keys: {0}")]
    KeyGenerationFailed(String),

    #[error("Failed to import key material: {0}")]
    ImportKeyFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Public key not found for peer: {0}")]
    PeerKeyNotFound(String),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Session bootstrap failed: {0}")]
    SessionBootstrapFailed(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Storage error: {0}")]
    StorageFailed(String),

    #[error("Serialization error: {0}")]
    SerializationFailed(String),

    #[error("Card delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),
}

pub type Result<T> = std::result::Result<T, CardSealError>;
