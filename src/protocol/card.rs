// Модели message card платформы
// Поля повторяют wire-формат host SDK (sendMessageCard)

use serde::{Deserialize, Serialize};

/// Содержимое карточки, передаваемое SDK-мосту
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardContent {
    /// Всегда `interactive`
    pub msg_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_multi: Option<bool>,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<CardConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<CardHeader>,
    #[serde(default)]
    pub elements: Vec<CardElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wide_screen_mode: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardHeader {
    pub title: CardText,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub header_type: Option<String>,
}

/// Элемент тела карточки.
///
/// Словарь тегов открыт (div, hr, img, button, ...), поэтому структура
/// терпима к незнакомым полям: известен только `tag` и возможный `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardElement {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<CardText>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardText {
    pub tag: String,
    pub content: String,
}

impl CardText {
    pub fn plain(content: &str) -> Self {
        Self {
            tag: "plain_text".to_string(),
            content: content.to_string(),
        }
    }
}

impl CardElement {
    /// Текстовый div — единственный элемент, который строит само ядро
    pub fn text(content: &str) -> Self {
        Self {
            tag: "div".to_string(),
            text: Some(CardText::plain(content)),
            extra: serde_json::Map::new(),
        }
    }
}

impl CardContent {
    /// Стандартная карточка протокола: заголовок + один текстовый элемент
    pub fn message(title: &str, body: &str) -> Self {
        Self {
            msg_type: "interactive".to_string(),
            update_multi: Some(false),
            card: Card {
                config: None,
                header: Some(CardHeader {
                    title: CardText::plain(title),
                    header_type: None,
                }),
                elements: vec![CardElement::text(body)],
            },
        }
    }
}

impl Card {
    pub fn title(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.title.content.as_str())
    }

    /// Первый текстонесущий элемент тела.
    ///
    /// При нескольких текстовых элементах берется первый встреченный,
    /// остальные игнорируются — задокументированная неоднозначность формата.
    pub fn first_text(&self) -> Option<&str> {
        self.elements
            .iter()
            .find_map(|e| e.text.as_ref().map(|t| t.content.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_card_shape() {
        let card = CardContent::message("回信#s1", "ciphertext");
        assert_eq!(card.msg_type, "interactive");
        assert_eq!(card.card.title(), Some("回信#s1"));
        assert_eq!(card.card.first_text(), Some("ciphertext"));
    }

    #[test]
    fn test_first_text_skips_non_text_elements() {
        let json = r#"{
            "msg_type": "interactive",
            "card": {
                "elements": [
                    {"tag": "hr"},
                    {"tag": "img", "image_key": "k", "alt": ""},
                    {"tag": "div", "text": {"tag": "plain_text", "content": "first"}},
                    {"tag": "div", "text": {"tag": "plain_text", "content": "second"}}
                ]
            }
        }"#;
        let card: CardContent = serde_json::from_str(json).unwrap();
        assert_eq!(card.card.first_text(), Some("first"));
    }

    #[test]
    fn test_wire_field_names() {
        let card = CardContent::message("t", "b");
        let raw = serde_json::to_string(&card).unwrap();
        assert!(raw.contains("\"msg_type\":\"interactive\""));
        assert!(raw.contains("\"update_multi\":false"));
        assert!(raw.contains("\"plain_text\""));
    }
}
