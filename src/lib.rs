// CardSeal Core
// Rust-ядро E2EE-надстройки над message-card механизмом чат-платформы

#![warn(clippy::all)]

// Модули
pub mod api;
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod state;
pub mod storage;
pub mod utils;

// Re-exports для удобства
pub use api::conversation::{ConversationController, Inbound, LocalIdentity};
pub use error::{CardSealError, Result};
pub use protocol::envelope::{classify, Classification, Envelope, EnvelopeKind};
pub use state::session::{Session, SessionPhase};
