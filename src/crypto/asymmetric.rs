// Асимметричный кодек: X25519 sealed box
//
// Пара ключей пригодна именно для шифрования/дешифрования (транспорт
// сессионного ключа), а не для подписи. Материал ключей живет только в
// переносимой Base64-кодировке, живые handle наружу не отдаются.
//
// Формат шифртекста: eph_pub(32) || nonce(12) || aead_ct

use crate::config::Config;
use crate::crypto::algorithms;
use crate::error::{CardSealError, Result};
use crate::utils::b64;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key as AeadKey, Nonce,
};
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// Контекст деривации sealed-box ключа
const SEALED_BOX_INFO: &[u8] = b"cardseal-sealed-box-v1";

/// Пара ключей в переносимой Base64-кодировке.
///
/// Инвариант: `private_key` никогда не покидает породивший её процесс.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

// Debug вручную: приватный ключ не должен утекать в логи
impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Сгенерировать пару ключей для указанного алгоритма
pub fn generate_key_pair(algorithm: &str) -> Result<KeyPair> {
    algorithms::ensure_supported(algorithm)?;

    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);

    Ok(KeyPair {
        public_key: b64::encode(public.as_bytes()),
        private_key: b64::encode(&secret.to_bytes()),
    })
}

/// Зашифровать короткий payload под публичным ключом получателя
pub fn encrypt(plaintext: &str, recipient_public: &str, algorithm: &str) -> Result<String> {
    algorithms::ensure_supported(algorithm)?;

    let recipient = import_public_key(recipient_public)?;

    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_public = PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&recipient);

    let aead_key = derive_seal_key(shared.as_bytes(), ephemeral_public.as_bytes())?;
    let cipher = ChaCha20Poly1305::new(AeadKey::from_slice(&aead_key[..]));

    let mut nonce = vec![0u8; Config::global().aead_nonce_length];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|e| CardSealError::EncryptionFailed(e.to_string()))?;

    let mut combined = Vec::with_capacity(32 + nonce.len() + ciphertext.len());
    combined.extend_from_slice(ephemeral_public.as_bytes());
    combined.extend_from_slice(&nonce);
    combined.extend_from_slice(&ciphertext);

    Ok(b64::encode(&combined))
}

/// Расшифровать payload собственным приватным ключом
pub fn decrypt(ciphertext: &str, own_private: &str, algorithm: &str) -> Result<String> {
    algorithms::ensure_supported(algorithm)?;

    let cfg = Config::global();
    let secret = import_private_key(own_private)?;

    let combined = b64::decode(ciphertext).map_err(CardSealError::DecryptionFailed)?;
    let min_len = cfg.public_key_length + cfg.aead_nonce_length + cfg.aead_tag_length;
    if combined.len() < min_len {
        return Err(CardSealError::DecryptionFailed(
            "Ciphertext too short".to_string(),
        ));
    }

    let (eph_bytes, rest) = combined.split_at(cfg.public_key_length);
    let (nonce, body) = rest.split_at(cfg.aead_nonce_length);

    let eph_array: [u8; 32] = eph_bytes
        .try_into()
        .map_err(|_| CardSealError::DecryptionFailed("Malformed ephemeral key".to_string()))?;
    let ephemeral_public = PublicKey::from(eph_array);

    let shared = secret.diffie_hellman(&ephemeral_public);
    let aead_key = derive_seal_key(shared.as_bytes(), ephemeral_public.as_bytes())?;
    let cipher = ChaCha20Poly1305::new(AeadKey::from_slice(&aead_key[..]));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), body)
        .map_err(|e| CardSealError::DecryptionFailed(e.to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| CardSealError::DecryptionFailed("Plaintext is not UTF-8".to_string()))
}

fn import_public_key(encoded: &str) -> Result<PublicKey> {
    let bytes = b64::decode(encoded).map_err(CardSealError::ImportKeyFailed)?;
    let array: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        CardSealError::ImportKeyFailed(format!(
            "Invalid public key length: expected {}, got {}",
            Config::global().public_key_length,
            bytes.len()
        ))
    })?;
    Ok(PublicKey::from(array))
}

fn import_private_key(encoded: &str) -> Result<StaticSecret> {
    let bytes = Zeroizing::new(b64::decode(encoded).map_err(CardSealError::ImportKeyFailed)?);
    let array: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        CardSealError::ImportKeyFailed("Invalid private key length".to_string())
    })?;
    Ok(StaticSecret::from(array))
}

/// HKDF-SHA256 поверх общего секрета; ephemeral public key выступает солью,
/// чтобы ключ AEAD был уникален для каждого конверта
fn derive_seal_key(shared_secret: &[u8], ephemeral_public: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    let hkdf = Hkdf::<Sha256>::new(Some(ephemeral_public), shared_secret);
    let mut key = Zeroizing::new([0u8; 32]);
    hkdf.expand(SEALED_BOX_INFO, &mut *key)
        .map_err(|e| CardSealError::EncryptionFailed(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_pair_x25519() {
        let pair = generate_key_pair("x25519").unwrap();
        assert_eq!(b64::decode(&pair.public_key).unwrap().len(), 32);
        assert_eq!(b64::decode(&pair.private_key).unwrap().len(), 32);
    }

    #[test]
    fn test_generate_key_pair_unknown_algorithm() {
        let err = generate_key_pair("md5").unwrap_err();
        assert!(matches!(err, CardSealError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_generate_key_pair_signing_only_algorithm() {
        let err = generate_key_pair("ed25519").unwrap_err();
        assert!(matches!(err, CardSealError::KeyGenerationFailed(_)));
    }

    #[test]
    fn test_round_trip() {
        let pair = generate_key_pair("x25519").unwrap();
        let sealed = encrypt("сессионный ключ", &pair.public_key, "x25519").unwrap();
        let opened = decrypt(&sealed, &pair.private_key, "x25519").unwrap();
        assert_eq!(opened, "сессионный ключ");
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let alice = generate_key_pair("x25519").unwrap();
        let mallory = generate_key_pair("x25519").unwrap();
        let sealed = encrypt("secret", &alice.public_key, "x25519").unwrap();
        let err = decrypt(&sealed, &mallory.private_key, "x25519").unwrap_err();
        assert!(matches!(err, CardSealError::DecryptionFailed(_)));
    }

    #[test]
    fn test_malformed_public_key_is_import_error() {
        let err = encrypt("secret", "not base64!!", "x25519").unwrap_err();
        assert!(matches!(err, CardSealError::ImportKeyFailed(_)));

        let short = b64::encode(&[1, 2, 3]);
        let err = encrypt("secret", &short, "x25519").unwrap_err();
        assert!(matches!(err, CardSealError::ImportKeyFailed(_)));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let pair = generate_key_pair("x25519").unwrap();
        let rendered = format!("{:?}", pair);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&pair.private_key));
    }
}
