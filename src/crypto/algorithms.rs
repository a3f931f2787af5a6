// Реестр асимметричных алгоритмов
//
// Двухуровневая проверка: имя вне реестра — UnsupportedAlgorithm;
// имя известно, но не обеспечено этой сборкой — KeyGenerationFailed.
// Ни один криптопримитив при этом не вызывается.

use crate::error::{CardSealError, Result};

/// Описание алгоритма в реестре
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub supported: bool,
    pub description: &'static str,
}

/// Закрытый словарь известных алгоритмов.
///
/// `rsa`/`ecdsa` оставлены для совместимости со старыми клиентами,
/// `ed25519` пригоден только для подписи — пары для транспорта ключа
/// из него не получить.
pub const ALGORITHMS: &[AlgorithmInfo] = &[
    AlgorithmInfo {
        name: "x25519",
        supported: true,
        description: "X25519 sealed box: ephemeral ECDH + HKDF-SHA256 + ChaCha20-Poly1305",
    },
    AlgorithmInfo {
        name: "rsa",
        supported: false,
        description: "RSA-OAEP (legacy clients only, not backed by this build)",
    },
    AlgorithmInfo {
        name: "ecdsa",
        supported: false,
        description: "ECDSA P-256 (signing-oriented, not backed by this build)",
    },
    AlgorithmInfo {
        name: "ed25519",
        supported: false,
        description: "Ed25519 (signing-only, unusable for key transport)",
    },
];

pub fn lookup(name: &str) -> Option<&'static AlgorithmInfo> {
    ALGORITHMS.iter().find(|a| a.name == name)
}

/// Проверить, что алгоритм известен и обеспечен
pub fn ensure_supported(name: &str) -> Result<&'static AlgorithmInfo> {
    match lookup(name) {
        None => Err(CardSealError::UnsupportedAlgorithm(name.to_string())),
        Some(info) if !info.supported => Err(CardSealError::KeyGenerationFailed(format!(
            "{} is not backed by this build",
            info.name
        ))),
        Some(info) => Ok(info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_algorithm_is_unsupported() {
        let err = ensure_supported("md5").unwrap_err();
        assert!(matches!(err, CardSealError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn test_known_but_unbacked_algorithm_fails_generation() {
        let err = ensure_supported("rsa").unwrap_err();
        assert!(matches!(err, CardSealError::KeyGenerationFailed(_)));
    }

    #[test]
    fn test_default_algorithm_is_supported() {
        let info = ensure_supported(crate::config::Config::global().default_algorithm).unwrap();
        assert!(info.supported);
    }
}
