// Конверт протокола
//
// Заголовок карточки несет "<kind>#<sessionId>", тело — payload как есть
// (шифртекст уже текстобезопасен, дополнительное кодирование не нужно).
// Словарь kind-меток закрыт и совпадает с wire-форматом исходного
// мини-приложения; неизвестная метка — не ошибка, а Unclassified.

use crate::protocol::card::{Card, CardContent, CardElement};
use crate::protocol::platform::{MessageType, PlatformMessage, TextContent};
use serde::Deserialize;
use tracing::debug;

/// Метка нового сеанса (wire-совместимость с исходным мини-приложением)
pub const NEW_SESSION_LABEL: &str = "新会话";
/// Метка ответа внутри сеанса
pub const REPLY_LABEL: &str = "回信";

/// Вид протокольного сообщения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Bootstrap сеанса: payload — сессионный ключ под публичным ключом получателя
    NewSession,
    /// Ответ: payload зашифрован сессионным ключом
    Reply,
    /// Открытый текст, без криптографической обработки
    Plain,
}

impl EnvelopeKind {
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::NewSession => Some(NEW_SESSION_LABEL),
            Self::Reply => Some(REPLY_LABEL),
            Self::Plain => None,
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            NEW_SESSION_LABEL => Some(Self::NewSession),
            REPLY_LABEL => Some(Self::Reply),
            _ => None,
        }
    }
}

/// Протокольный конверт: kind + sessionId + payload
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub kind: EnvelopeKind,
    pub session_id: Option<String>,
    pub payload: String,
}

impl Envelope {
    pub fn new_session(session_id: &str, payload: String) -> Self {
        Self {
            kind: EnvelopeKind::NewSession,
            session_id: Some(session_id.to_string()),
            payload,
        }
    }

    pub fn reply(session_id: &str, payload: String) -> Self {
        Self {
            kind: EnvelopeKind::Reply,
            session_id: Some(session_id.to_string()),
            payload,
        }
    }

    pub fn plain(payload: String) -> Self {
        Self {
            kind: EnvelopeKind::Plain,
            session_id: None,
            payload,
        }
    }

    /// Заголовок карточки: `"<kind>#<sessionId>"`, для Plain — пусто
    pub fn title(&self) -> String {
        match (self.kind.label(), &self.session_id) {
            (Some(label), Some(id)) => format!("{}#{}", label, id),
            (Some(label), None) => label.to_string(),
            (None, _) => String::new(),
        }
    }

    /// Упаковать конверт в message card для SDK-моста
    pub fn encode(&self) -> CardContent {
        CardContent::message(&self.title(), &self.payload)
    }
}

/// Результат классификации входящего сообщения платформы
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Envelope(Envelope),
    /// Форма не распознана; raw отдается в UI как есть
    Unclassified { raw: String },
}

/// Классифицировать входящее сообщение платформы.
///
/// Best-effort: любой сбой разбора (битый JSON, отсутствующие поля,
/// неизвестная метка) деградирует до `Unclassified`, никогда не паникует
/// и не возвращает ошибку вызывающему.
pub fn classify(message: &PlatformMessage) -> Classification {
    match message.message_type {
        MessageType::Text => {
            // text-сообщение — всегда Plain; вытаскиваем поле text,
            // при неудаче отдаем content целиком
            let payload = serde_json::from_str::<TextContent>(&message.content)
                .map(|c| c.text)
                .unwrap_or_else(|_| message.content.clone());
            Classification::Envelope(Envelope::plain(payload))
        }
        MessageType::Interactive => match classify_interactive(&message.content) {
            Some(envelope) => Classification::Envelope(envelope),
            None => {
                debug!("interactive message did not match protocol shape");
                Classification::Unclassified {
                    raw: message.content.clone(),
                }
            }
        },
        MessageType::Unknown => Classification::Unclassified {
            raw: message.content.clone(),
        },
    }
}

/// Карточка из выдачи платформы: либо обертка CardContent, либо «голая»
/// карточка с заголовком/элементами на верхнем уровне
#[derive(Deserialize)]
struct InboundCard {
    #[serde(default)]
    card: Option<Card>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    header: Option<crate::protocol::card::CardHeader>,
    #[serde(default)]
    elements: Vec<CardElement>,
}

impl InboundCard {
    fn title(&self) -> Option<String> {
        if let Some(card) = &self.card {
            return card.title().map(str::to_string);
        }
        if let Some(title) = &self.title {
            return Some(title.clone());
        }
        self.header.as_ref().map(|h| h.title.content.clone())
    }

    fn first_text(&self) -> Option<String> {
        let elements = match &self.card {
            Some(card) => &card.elements,
            None => &self.elements,
        };
        elements
            .iter()
            .find_map(|e| e.text.as_ref().map(|t| t.content.clone()))
    }
}

fn classify_interactive(content: &str) -> Option<Envelope> {
    let card: InboundCard = serde_json::from_str(content).ok()?;
    let title = card.title()?;
    let payload = card.first_text()?;

    let (label, session_id) = title.split_once('#')?;
    let kind = EnvelopeKind::from_label(label)?;

    Some(Envelope {
        kind,
        session_id: Some(session_id.to_string()),
        payload,
    })
}
