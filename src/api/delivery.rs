// Доставка message card через SDK-мост платформы
//
// Поля SendCardOptions повторяют вызов sendMessageCard host SDK.
// Доставка — fire-and-forget: подтверждения прочтения нет.

use crate::error::Result;
use crate::protocol::card::CardContent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Параметры отправки карточки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCardOptions {
    pub should_choose_chat: bool,
    #[serde(default, rename = "openChatIDs", skip_serializing_if = "Option::is_none")]
    pub open_chat_ids: Option<Vec<String>>,
    #[serde(default, rename = "openIDs", skip_serializing_if = "Option::is_none")]
    pub open_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_code: Option<String>,
    pub card_content: CardContent,
}

impl SendCardOptions {
    /// Отправка в текущий чат (контекст message action платформы)
    pub fn current_chat(card_content: CardContent) -> Self {
        Self {
            should_choose_chat: false,
            open_chat_ids: None,
            open_ids: None,
            trigger_code: None,
            card_content,
        }
    }

    /// Отправка в конкретный чат по open_chat_id
    pub fn to_chat(open_chat_id: &str, card_content: CardContent) -> Self {
        Self {
            should_choose_chat: false,
            open_chat_ids: Some(vec![open_chat_id.to_string()]),
            open_ids: None,
            trigger_code: None,
            card_content,
        }
    }
}

/// Исходящий канал: карточка уходит в host SDK
#[async_trait]
pub trait CardDelivery: Send + Sync {
    async fn send_card(&self, options: SendCardOptions) -> Result<()>;
}
