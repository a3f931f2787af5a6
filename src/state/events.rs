// Канал событий для UI
//
// Явный observable-канал с жизненным циклом subscribe/unsubscribe,
// принадлежащий композирующему приложению — не глобальный список
// подписчиков. Закрытые получатели вычищаются при emit.

use std::collections::HashMap;
use tokio::sync::mpsc;

/// Уведомления о ходе диалога; каждый сбой дает ровно одно Error-событие
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    SessionStarted { session_id: String },
    SessionEstablished { session_id: String },
    MessageReceived { session_id: Option<String> },
    ReplySent { session_id: String },
    KeyRegistered { identity: String },
    Error { message: String },
}

pub type SubscriberId = u64;

/// Канал событий с явной подпиской
#[derive(Default)]
pub struct EventChannel {
    next_id: SubscriberId,
    subscribers: HashMap<SubscriberId, mpsc::UnboundedSender<ChatEvent>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> (SubscriberId, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.insert(id, tx);
        (id, rx)
    }

    /// Отписаться; `false`, если подписки уже нет
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn emit(&mut self, event: ChatEvent) {
        self.subscribers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_emit_receive() {
        let mut channel = EventChannel::new();
        let (_id, mut rx) = channel.subscribe();

        channel.emit(ChatEvent::SessionStarted {
            session_id: "s1".into(),
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            ChatEvent::SessionStarted {
                session_id: "s1".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let mut channel = EventChannel::new();
        let (id, mut rx) = channel.subscribe();

        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));

        channel.emit(ChatEvent::Error {
            message: "x".into(),
        });
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let mut channel = EventChannel::new();
        let (_id, rx) = channel.subscribe();
        drop(rx);

        channel.emit(ChatEvent::Error {
            message: "x".into(),
        });
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_all_receive() {
        let mut channel = EventChannel::new();
        let (_a, mut rx_a) = channel.subscribe();
        let (_b, mut rx_b) = channel.subscribe();

        channel.emit(ChatEvent::ReplySent {
            session_id: "s1".into(),
        });

        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.recv().await.is_some());
    }
}
