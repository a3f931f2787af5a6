// Входящие сообщения платформы
//
// JSON платформы разбирается и валидируется один раз на границе — дальше
// по ядру ходят только типизированные значения. Незнакомые формы не
// роняют разбор: неизвестный messageType остается Unknown.

use crate::error::{CardSealError, Result};
use serde::{Deserialize, Serialize};

/// Дискриминатор типа сообщения платформы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Interactive,
    #[serde(other)]
    Unknown,
}

/// Отправитель сообщения.
///
/// Платформа отдает open_id в snake_case даже внутри camelCase-структуры.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sender {
    pub open_id: String,
    #[serde(default)]
    pub name: String,
}

/// Одно сообщение из выдачи платформы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMessage {
    pub message_type: MessageType,
    /// Вложенный JSON: для text — `{"text": ...}`, для interactive — карточка
    pub content: String,
    pub sender: Sender,
    #[serde(default)]
    pub open_chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

/// Ответ capability получения исходного сообщения (message action)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDetail {
    pub content: MessageList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<PlatformMessage>,
}

impl MessageDetail {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| CardSealError::SerializationFailed(e.to_string()))
    }

    /// Триггерное сообщение — первое в списке
    pub fn trigger_message(&self) -> Option<&PlatformMessage> {
        self.content.messages.first()
    }
}

/// Содержимое text-сообщения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
}
