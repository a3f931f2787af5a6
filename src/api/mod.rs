//! Высокоуровневый API ядра
//!
//! Внешние коллабораторы (каталог ключей, доставка карточек, token-сервис)
//! заданы трейтами — SDK-мост платформы реализует их снаружи ядра.

pub mod conversation;
pub mod delivery;
pub mod directory;
pub mod token;

pub use conversation::{ConversationController, Inbound, LocalIdentity};
pub use delivery::{CardDelivery, SendCardOptions};
pub use directory::{IdentityDirectory, InMemoryDirectory};
pub use token::{JsapiSignature, TokenBackend, TokenClient, UserAccessToken};
