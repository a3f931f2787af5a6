// Временные утилиты

use std::time::{SystemTime, UNIX_EPOCH};

/// Текущий Unix timestamp в миллисекундах
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Текущий Unix timestamp в секундах
pub fn current_timestamp() -> i64 {
    (current_timestamp_ms() / 1000) as i64
}
