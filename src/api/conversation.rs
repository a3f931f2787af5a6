// Контроллер бесед — state machine сеансов
//
// Оркестрация: входящее сообщение платформы -> classify -> ключ из
// SessionKeyStore / bootstrap через асимметричный кодек -> открытый текст
// в UI. Исходящее: открытый текст -> симметричный кодек -> конверт ->
// SDK-мост. Каждый сбой дает ровно одно человекочитаемое Error-событие
// и не оставляет хранилище в полусостоянии.

use crate::config::Config;
use crate::crypto::{asymmetric, symmetric, KeyPair};
use crate::error::{CardSealError, Result};
use crate::protocol::envelope::{classify, Classification, Envelope, EnvelopeKind};
use crate::protocol::platform::PlatformMessage;
use crate::state::events::{ChatEvent, EventChannel, SubscriberId};
use crate::state::session::Session;
use crate::storage::{KvStore, SessionKeyStore};
use crate::utils::uuid;
use crate::api::delivery::{CardDelivery, SendCardOptions};
use crate::api::directory::IdentityDirectory;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// Локальная identity: open_id пользователя и его пара ключей.
///
/// Приватный ключ не покидает процесс; наружу уходит только публичная часть.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    pub open_id: String,
    pub key_pair: KeyPair,
}

impl LocalIdentity {
    pub fn new(open_id: &str, key_pair: KeyPair) -> Self {
        Self {
            open_id: open_id.to_string(),
            key_pair,
        }
    }

    /// Сгенерировать identity с новой парой ключей алгоритма по умолчанию
    pub fn generate(open_id: &str) -> Result<Self> {
        let key_pair = asymmetric::generate_key_pair(Config::global().default_algorithm)?;
        Ok(Self::new(open_id, key_pair))
    }
}

/// Результат обработки входящего сообщения, отдаваемый UI
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// NEW_SESSION: сессионный ключ восстановлен — сигнал «сеанс установлен»
    SessionEstablished {
        session_id: String,
        symmetric_key: String,
    },
    /// REPLY: расшифрованный текст собеседника
    Message {
        session_id: String,
        plaintext: String,
    },
    /// PLAIN / нераспознанное: содержимое как есть, без криптообработки
    Plain { text: String },
}

/// Контроллер одного диалога
pub struct ConversationController<D, T, S>
where
    D: IdentityDirectory,
    T: CardDelivery,
    S: KvStore,
{
    identity: LocalIdentity,
    directory: D,
    delivery: T,
    keys: SessionKeyStore<S>,
    events: EventChannel,
    session: Option<Session>,
}

impl<D, T, S> ConversationController<D, T, S>
where
    D: IdentityDirectory,
    T: CardDelivery,
    S: KvStore,
{
    pub fn new(identity: LocalIdentity, directory: D, delivery: T, store: S) -> Self {
        Self {
            identity,
            directory,
            delivery,
            keys: SessionKeyStore::new(store),
            events: EventChannel::new(),
            session: None,
        }
    }

    /// Текущий сеанс (None = Idle)
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn local_identity(&self) -> &LocalIdentity {
        &self.identity
    }

    pub fn subscribe(&mut self) -> (SubscriberId, UnboundedReceiver<ChatEvent>) {
        self.events.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Начать новый сеанс с собеседником.
    ///
    /// Idle -> Initiating -> Active оптимистично: ack-шага нет, доставка
    /// fire-and-forget. Ключ попадает в хранилище только после успешной
    /// отправки — неудавшийся старт не оставляет висячей записи.
    pub async fn start_new_session(
        &mut self,
        peer_identity: &str,
        open_chat_id: &str,
    ) -> Result<Session> {
        let result = self.start_new_session_inner(peer_identity, open_chat_id).await;
        self.notify_on_error(&result);
        result
    }

    async fn start_new_session_inner(
        &mut self,
        peer_identity: &str,
        open_chat_id: &str,
    ) -> Result<Session> {
        let algorithm = Config::global().default_algorithm;
        let session_id = uuid::generate_v4();
        let symmetric_key = symmetric::generate_key();

        let peer_public = self
            .directory
            .get_public_key(peer_identity)
            .await?
            .ok_or_else(|| CardSealError::PeerKeyNotFound(peer_identity.to_string()))?;

        let session = Session::initiating(
            session_id.clone(),
            peer_identity.to_string(),
            open_chat_id.to_string(),
        );

        let sealed_key = asymmetric::encrypt(&symmetric_key, &peer_public, algorithm)?;
        let envelope = Envelope::new_session(&session_id, sealed_key);
        self.delivery
            .send_card(SendCardOptions::current_chat(envelope.encode()))
            .await?;

        self.keys
            .set(&session_id, &symmetric_key, self.session_key_ttl())
            .await?;

        let session = session.activated();
        self.session = Some(session.clone());
        info!(session_id = %session_id, peer = %peer_identity, "new session started");
        self.events.emit(ChatEvent::SessionStarted { session_id });

        Ok(session)
    }

    /// Обработать входящее сообщение платформы: синхронизировать свой
    /// публичный ключ (best-effort) и прогнать классификацию
    pub async fn receive_platform_message(&mut self, message: &PlatformMessage) -> Result<Inbound> {
        self.sync_public_key().await;

        match classify(message) {
            Classification::Envelope(envelope) => {
                self.receive_classified(envelope, &message.sender.open_id, &message.open_chat_id)
                    .await
            }
            Classification::Unclassified { raw } => {
                info!("unclassified platform message surfaced as-is");
                Ok(Inbound::Plain { text: raw })
            }
        }
    }

    /// Обработать уже классифицированный конверт (контекст отправителя неизвестен)
    pub async fn receive_envelope(&mut self, envelope: Envelope) -> Result<Inbound> {
        self.receive_classified(envelope, "", "").await
    }

    async fn receive_classified(
        &mut self,
        envelope: Envelope,
        peer_identity: &str,
        open_chat_id: &str,
    ) -> Result<Inbound> {
        let result = self
            .receive_classified_inner(envelope, peer_identity, open_chat_id)
            .await;
        self.notify_on_error(&result);
        result
    }

    async fn receive_classified_inner(
        &mut self,
        envelope: Envelope,
        peer_identity: &str,
        open_chat_id: &str,
    ) -> Result<Inbound> {
        match envelope.kind {
            EnvelopeKind::NewSession => {
                let session_id = envelope.session_id.clone().ok_or_else(|| {
                    CardSealError::SessionBootstrapFailed("Envelope has no session id".to_string())
                })?;

                let symmetric_key = asymmetric::decrypt(
                    &envelope.payload,
                    &self.identity.key_pair.private_key,
                    Config::global().default_algorithm,
                )
                .map_err(|e| CardSealError::SessionBootstrapFailed(e.to_string()))?;

                // last-write-wins: повторный NEW_SESSION с тем же id затирает ключ
                self.keys
                    .set(&session_id, &symmetric_key, self.session_key_ttl())
                    .await?;

                self.session = Some(Session::established(
                    session_id.clone(),
                    peer_identity.to_string(),
                    open_chat_id.to_string(),
                ));
                info!(session_id = %session_id, "session established from NEW_SESSION envelope");
                self.events.emit(ChatEvent::SessionEstablished {
                    session_id: session_id.clone(),
                });

                Ok(Inbound::SessionEstablished {
                    session_id,
                    symmetric_key,
                })
            }
            EnvelopeKind::Reply => {
                let session_id = envelope.session_id.clone().ok_or_else(|| {
                    CardSealError::UnknownSession("Envelope has no session id".to_string())
                })?;

                let key = self
                    .keys
                    .get(&session_id)
                    .await?
                    .ok_or_else(|| CardSealError::UnknownSession(session_id.clone()))?;

                let plaintext = symmetric::decrypt(&envelope.payload, &key)?;
                self.events.emit(ChatEvent::MessageReceived {
                    session_id: Some(session_id.clone()),
                });

                Ok(Inbound::Message {
                    session_id,
                    plaintext,
                })
            }
            EnvelopeKind::Plain => {
                self.events
                    .emit(ChatEvent::MessageReceived { session_id: None });
                Ok(Inbound::Plain {
                    text: envelope.payload,
                })
            }
        }
    }

    /// Отправить зашифрованный ответ в сеансе.
    ///
    /// Неизвестный сеанс — типизированный отказ; хранилище при этом
    /// не мутируется.
    pub async fn send_reply(&mut self, session_id: &str, plaintext: &str) -> Result<()> {
        let result = self.send_reply_inner(session_id, plaintext).await;
        self.notify_on_error(&result);
        result
    }

    async fn send_reply_inner(&mut self, session_id: &str, plaintext: &str) -> Result<()> {
        let key = self
            .keys
            .get(session_id)
            .await?
            .ok_or_else(|| CardSealError::UnknownSession(session_id.to_string()))?;

        let ciphertext = symmetric::encrypt(plaintext, &key)?;
        let envelope = Envelope::reply(session_id, ciphertext);
        self.delivery
            .send_card(SendCardOptions::current_chat(envelope.encode()))
            .await?;

        info!(session_id = %session_id, "reply sent");
        self.events.emit(ChatEvent::ReplySent {
            session_id: session_id.to_string(),
        });
        Ok(())
    }

    /// Опортунистическая сверка с каталогом: если запись о нашем публичном
    /// ключе отсутствует или устарела — перерегистрировать. Best-effort,
    /// обработку сообщений не блокирует.
    pub async fn sync_public_key(&mut self) {
        let own_public = self.identity.key_pair.public_key.clone();
        match self.directory.get_public_key(&self.identity.open_id).await {
            Ok(Some(registered)) if registered == own_public => {}
            Ok(_) => {
                match self
                    .directory
                    .register_public_key(&self.identity.open_id, &own_public)
                    .await
                {
                    Ok(()) => {
                        info!(identity = %self.identity.open_id, "public key registered in directory");
                        self.events.emit(ChatEvent::KeyRegistered {
                            identity: self.identity.open_id.clone(),
                        });
                    }
                    Err(e) => warn!(error = %e, "public key registration failed, will retry on next message"),
                }
            }
            Err(e) => warn!(error = %e, "directory lookup failed, skipping key sync"),
        }
    }

    /// Забыть сеанс локально: ключ из хранилища и состояние контроллера
    pub async fn clear_session(&mut self, session_id: &str) -> Result<()> {
        self.keys.remove(session_id).await?;
        if self.session.as_ref().map(|s| s.session_id.as_str()) == Some(session_id) {
            self.session = None;
        }
        Ok(())
    }

    fn session_key_ttl(&self) -> Option<Duration> {
        Config::global().session_key_ttl_ms.map(Duration::from_millis)
    }

    fn notify_on_error<V>(&mut self, result: &Result<V>) {
        if let Err(e) = result {
            warn!(error = %e, "conversation operation failed");
            self.events.emit(ChatEvent::Error {
                message: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::directory::InMemoryDirectory;
    use crate::state::session::SessionPhase;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingDelivery {
        sent: Arc<Mutex<Vec<SendCardOptions>>>,
    }

    impl RecordingDelivery {
        fn sent(&self) -> Vec<SendCardOptions> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CardDelivery for RecordingDelivery {
        async fn send_card(&self, options: SendCardOptions) -> Result<()> {
            self.sent.lock().unwrap().push(options);
            Ok(())
        }
    }

    struct FailingDelivery;

    #[async_trait]
    impl CardDelivery for FailingDelivery {
        async fn send_card(&self, _options: SendCardOptions) -> Result<()> {
            Err(CardSealError::DeliveryFailed("bridge unavailable".into()))
        }
    }

    fn controller_with<T: CardDelivery>(
        delivery: T,
        directory: Arc<InMemoryDirectory>,
    ) -> ConversationController<Arc<InMemoryDirectory>, T, MemoryStore> {
        let identity = LocalIdentity::generate("ou_me").unwrap();
        ConversationController::new(identity, directory, delivery, MemoryStore::new())
    }

    #[tokio::test]
    async fn test_start_new_session_sends_card_and_activates() {
        let directory = Arc::new(InMemoryDirectory::new());
        let peer = LocalIdentity::generate("ou_peer").unwrap();
        directory
            .register_public_key("ou_peer", &peer.key_pair.public_key)
            .await
            .unwrap();

        let delivery = RecordingDelivery::default();
        let mut controller = controller_with(delivery.clone(), directory);

        let session = controller.start_new_session("ou_peer", "oc_1").await.unwrap();
        assert_eq!(session.phase, SessionPhase::Active);
        assert_eq!(controller.session().unwrap().session_id, session.session_id);

        let sent = delivery.sent();
        assert_eq!(sent.len(), 1);
        let title = sent[0].card_content.card.title().unwrap().to_string();
        assert_eq!(
            title,
            format!("{}#{}", crate::protocol::envelope::NEW_SESSION_LABEL, session.session_id)
        );

        // ключ сохранен: ответ в этом сеансе шифруется без ошибок
        controller.send_reply(&session.session_id, "ok").await.unwrap();
        assert_eq!(delivery.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_start_without_peer_key_is_typed_failure() {
        let directory = Arc::new(InMemoryDirectory::new());
        let mut controller = controller_with(RecordingDelivery::default(), directory);
        let (_id, mut rx) = controller.subscribe();

        let err = controller.start_new_session("ou_ghost", "oc_1").await.unwrap_err();
        assert!(matches!(err, CardSealError::PeerKeyNotFound(_)));
        assert!(controller.session().is_none());

        // ровно одно Error-событие
        assert!(matches!(rx.try_recv().unwrap(), ChatEvent::Error { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_delivery_leaves_no_session_key() {
        let directory = Arc::new(InMemoryDirectory::new());
        let peer = LocalIdentity::generate("ou_peer").unwrap();
        directory
            .register_public_key("ou_peer", &peer.key_pair.public_key)
            .await
            .unwrap();

        let mut controller = controller_with(FailingDelivery, directory);
        let err = controller.start_new_session("ou_peer", "oc_1").await.unwrap_err();
        assert!(matches!(err, CardSealError::DeliveryFailed(_)));
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn test_reply_to_unknown_session_does_not_mutate_store() {
        let directory = Arc::new(InMemoryDirectory::new());
        let mut controller = controller_with(RecordingDelivery::default(), directory);

        let err = controller.send_reply("no-such-session", "hi").await.unwrap_err();
        assert!(matches!(err, CardSealError::UnknownSession(_)));

        // повторная попытка падает так же: отказ ничего не записал
        let err = controller.send_reply("no-such-session", "hi").await.unwrap_err();
        assert!(matches!(err, CardSealError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_reply_envelope_for_unknown_session_is_error() {
        let directory = Arc::new(InMemoryDirectory::new());
        let mut controller = controller_with(RecordingDelivery::default(), directory);

        let envelope = Envelope::reply("missing", "Y3Q=".to_string());
        let err = controller.receive_envelope(envelope).await.unwrap_err();
        assert!(matches!(err, CardSealError::UnknownSession(_)));
    }

    #[tokio::test]
    async fn test_plain_envelope_passes_through() {
        let directory = Arc::new(InMemoryDirectory::new());
        let mut controller = controller_with(RecordingDelivery::default(), directory);

        let inbound = controller
            .receive_envelope(Envelope::plain("привет".to_string()))
            .await
            .unwrap();
        assert_eq!(inbound, Inbound::Plain { text: "привет".to_string() });
    }

    #[tokio::test]
    async fn test_sync_registers_missing_public_key() {
        let directory = Arc::new(InMemoryDirectory::new());
        let mut controller = controller_with(RecordingDelivery::default(), directory.clone());
        let (_id, mut rx) = controller.subscribe();

        controller.sync_public_key().await;
        assert_eq!(
            directory.get_public_key("ou_me").await.unwrap().as_deref(),
            Some(controller.local_identity().key_pair.public_key.as_str())
        );
        assert!(matches!(rx.try_recv().unwrap(), ChatEvent::KeyRegistered { .. }));

        // повторная сверка ничего не перерегистрирует
        controller.sync_public_key().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clear_session_forgets_key_and_state() {
        let directory = Arc::new(InMemoryDirectory::new());
        let peer = LocalIdentity::generate("ou_peer").unwrap();
        directory
            .register_public_key("ou_peer", &peer.key_pair.public_key)
            .await
            .unwrap();

        let mut controller = controller_with(RecordingDelivery::default(), directory);
        let session = controller.start_new_session("ou_peer", "oc_1").await.unwrap();

        controller.clear_session(&session.session_id).await.unwrap();
        assert!(controller.session().is_none());
        let err = controller.send_reply(&session.session_id, "x").await.unwrap_err();
        assert!(matches!(err, CardSealError::UnknownSession(_)));
    }
}
