// Симметричный кодек: AES-128-GCM
//
// На каждый вызов encrypt — свежий случайный IV, приклеенный к шифртексту
// перед кодированием. Переиспользование IV недопустимо: это инвариант
// корректности, а не оптимизация.
//
// Формат шифртекста: iv(12) || aead_ct

use crate::config::Config;
use crate::error::{CardSealError, Result};
use crate::utils::b64;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Key, Nonce,
};
use rand::rngs::OsRng;
use rand_core::RngCore;
use zeroize::Zeroizing;

/// Сгенерировать случайный 128-битный сессионный ключ (Base64)
pub fn generate_key() -> String {
    let mut key = Zeroizing::new(vec![0u8; Config::global().symmetric_key_length]);
    OsRng.fill_bytes(&mut key);
    b64::encode(&key)
}

/// Зашифровать текст сессионным ключом
pub fn encrypt(plaintext: &str, key_b64: &str) -> Result<String> {
    let key = import_key(key_b64)?;
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(&key));

    let mut iv = vec![0u8; Config::global().aead_nonce_length];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|e| CardSealError::EncryptionFailed(e.to_string()))?;

    let mut combined = Vec::with_capacity(iv.len() + ciphertext.len());
    combined.extend_from_slice(&iv);
    combined.extend_from_slice(&ciphertext);

    Ok(b64::encode(&combined))
}

/// Расшифровать текст сессионным ключом.
///
/// Любой сбой шифра — один и тот же `DecryptionFailed`: по ошибке нельзя
/// отличить неверный ключ от испорченных данных.
pub fn decrypt(ciphertext_b64: &str, key_b64: &str) -> Result<String> {
    let cfg = Config::global();
    let key = import_key(key_b64)?;
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(&key));

    let combined = b64::decode(ciphertext_b64).map_err(CardSealError::DecryptionFailed)?;
    if combined.len() < cfg.aead_nonce_length + cfg.aead_tag_length {
        return Err(CardSealError::DecryptionFailed(
            "Ciphertext too short".to_string(),
        ));
    }

    let (iv, body) = combined.split_at(cfg.aead_nonce_length);

    let plaintext = cipher
        .decrypt(Nonce::from_slice(iv), body)
        .map_err(|_| CardSealError::DecryptionFailed("AEAD open failed".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| CardSealError::DecryptionFailed("Plaintext is not UTF-8".to_string()))
}

fn import_key(encoded: &str) -> Result<Zeroizing<Vec<u8>>> {
    let bytes = Zeroizing::new(b64::decode(encoded).map_err(CardSealError::ImportKeyFailed)?);
    let expected = Config::global().symmetric_key_length;
    if bytes.len() != expected {
        return Err(CardSealError::ImportKeyFailed(format!(
            "Invalid symmetric key length: expected {}, got {}",
            expected,
            bytes.len()
        )));
    }
    Ok(bytes)
}
