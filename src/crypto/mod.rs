//! Криптографический модуль
//!
//! Два кодека без внутреннего состояния:
//! - [`asymmetric`]: транспорт сессионного ключа — X25519 sealed box
//!   (ephemeral DH + HKDF-SHA256 + ChaCha20-Poly1305)
//! - [`symmetric`]: переписка внутри сессии — AES-128-GCM со случайным
//!   nonce, приклеенным к шифртексту
//!
//! Реестр алгоритмов ([`algorithms`]) — закрытый словарь: неизвестное имя
//! отклоняется до обращения к примитивам.

pub mod algorithms;
pub mod asymmetric;
pub mod symmetric;

pub use asymmetric::KeyPair;
