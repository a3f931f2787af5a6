// Состояние приложения

pub mod events;
pub mod session;
