// Маршрутизатор прикладного JSON-протокола
//
// Точка расширения, независимая от контроллера бесед: новые виды
// сообщений добавляются регистрацией обработчика, без правок ядра.

use crate::error::{CardSealError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{error, info};

/// Сообщение прикладного протокола
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtocolMessage {
    pub method: String,
    #[serde(default)]
    pub pub_key: String,
    #[serde(default)]
    pub data: String,
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
type Handler = Box<dyn Fn(ProtocolMessage) -> HandlerFuture + Send + Sync>;

/// Диспетчер method -> асинхронный обработчик
#[derive(Default)]
pub struct ProtocolRouter {
    handlers: HashMap<String, Handler>,
}

impl ProtocolRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Зарегистрировать обработчик метода.
    ///
    /// Повторная регистрация молча затирает предыдущий обработчик —
    /// задокументированное поведение, предупреждения нет.
    pub fn register<F, Fut>(&mut self, method: &str, handler: F)
    where
        F: Fn(ProtocolMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.handlers
            .insert(method.to_string(), Box::new(move |m| Box::pin(handler(m))));
    }

    /// Обработать сообщение
    pub async fn handle(&self, message: ProtocolMessage) -> Result<()> {
        match self.handlers.get(&message.method) {
            Some(handler) => handler(message).await,
            None => {
                error!(method = %message.method, "no handler registered");
                Err(CardSealError::UnsupportedMethod(message.method))
            }
        }
    }

    pub fn methods(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }
}

/// Роутер с log-only обработчиками по умолчанию.
///
/// Обработчики пустые намеренно: они фиксируют контракт диспетчеризации,
/// а не реализуют реальные методы протокола.
pub fn default_router() -> ProtocolRouter {
    let mut router = ProtocolRouter::new();

    router.register("echo", |message| async move {
        info!(method = "echo", data = %message.data, "received protocol message");
        Ok(())
    });

    router.register("encrypt", |message| async move {
        info!(method = "encrypt", data = %message.data, "received protocol message");
        Ok(())
    });

    router.register("decrypt", |message| async move {
        info!(method = "decrypt", data = %message.data, "received protocol message");
        Ok(())
    });

    router
}
