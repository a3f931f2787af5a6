// Сессия — неизменяемое значение
//
// Никаких сеттеров: переходы фаз порождают новое значение и выполняются
// только функциями контроллера. Ключевой материал в Session не хранится —
// он живет в SessionKeyStore под session_id.

use crate::utils::time::current_timestamp;
use serde::{Deserialize, Serialize};

/// Фаза сеанса.
///
/// Терминальной фазы нет: сеанс живет, пока его локально не очистят.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Активного сеанса нет
    Idle,
    /// Ключ сгенерирован и отправлен, подтверждения доставки не ждем
    Initiating,
    /// Обе стороны владеют сессионным ключом
    Active,
}

/// Один логический шифрованный диалог между двумя identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub peer_identity: String,
    pub open_chat_id: String,
    pub phase: SessionPhase,
    pub created_at: i64,
}

impl Session {
    /// Сеанс на стороне инициатора: ключ отправлен, доставка не подтверждена
    pub fn initiating(session_id: String, peer_identity: String, open_chat_id: String) -> Self {
        Self {
            session_id,
            peer_identity,
            open_chat_id,
            phase: SessionPhase::Initiating,
            created_at: current_timestamp(),
        }
    }

    /// Сеанс на стороне получателя: ключ восстановлен из NEW_SESSION конверта
    pub fn established(session_id: String, peer_identity: String, open_chat_id: String) -> Self {
        Self {
            session_id,
            peer_identity,
            open_chat_id,
            phase: SessionPhase::Active,
            created_at: current_timestamp(),
        }
    }

    /// Переход Initiating -> Active (оптимистичный, без ack)
    pub fn activated(self) -> Self {
        Self {
            phase: SessionPhase::Active,
            ..self
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }
}
