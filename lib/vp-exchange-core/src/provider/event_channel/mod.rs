//! Host message bus contracts.
//!
//! Inbound events reach an [`EventProcessor`], which reports back through a
//! [`Notifier`]. Collaborators reach other host components through an
//! [`EventChannel`].

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::model::message::{Message, Notification, Outcome};

#[cfg(test)]
mod test;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Message without type cannot be dispatched")]
    MissingMessageType,
}

/// Receives outbound notifications emitted while an event is handled
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<F> Notifier for F
where
    F: Fn(Notification) + Send + Sync,
{
    fn notify(&self, notification: Notification) {
        self(notification)
    }
}

/// Handler of inbound host events
#[async_trait::async_trait]
pub trait EventProcessor: Send + Sync {
    fn name(&self) -> &str;

    async fn handle_event(&self, message: Message, notifier: &dyn Notifier) -> Outcome;
}

/// The host bus as seen from inside the core
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait EventChannel: Send + Sync {
    /// Delivers a message and returns every notification emitted in response
    async fn dispatch(&self, message: Message) -> Result<Vec<Notification>, ChannelError>;
}

/// Buffers notifications in emission order
pub struct NotificationCollector {
    sender: UnboundedSender<Notification>,
    receiver: UnboundedReceiver<Notification>,
}

impl Default for NotificationCollector {
    fn default() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self { sender, receiver }
    }
}

impl NotificationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_notifications(mut self) -> Vec<Notification> {
        let mut notifications = vec![];
        while let Ok(notification) = self.receiver.try_recv() {
            notifications.push(notification);
        }
        notifications
    }
}

impl Notifier for NotificationCollector {
    fn notify(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            tracing::warn!("Notification dropped, collector closed");
        }
    }
}

/// In-process bus fanning every message out to all registered processors
#[derive(Default)]
pub struct LocalEventBus {
    processors: RwLock<Vec<Arc<dyn EventProcessor>>>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, processor: Arc<dyn EventProcessor>) {
        tracing::debug!(processor = processor.name(), "Registering event processor");
        self.processors.write().await.push(processor);
    }

    /// Hands the message to every processor in registration order and
    /// returns their outcomes in the same order
    pub async fn deliver(&self, message: Message, notifier: &dyn Notifier) -> Vec<Outcome> {
        // snapshot so processors may dispatch back into the bus
        let processors = self.processors.read().await.clone();

        let mut outcomes = Vec::with_capacity(processors.len());
        for processor in processors {
            let outcome = processor.handle_event(message.clone(), notifier).await;
            tracing::debug!(
                processor = processor.name(),
                message_type = %message.r#type,
                %outcome,
                "Event handled"
            );
            outcomes.push(outcome);
        }
        outcomes
    }
}

#[async_trait::async_trait]
impl EventChannel for LocalEventBus {
    async fn dispatch(&self, message: Message) -> Result<Vec<Notification>, ChannelError> {
        if message.r#type.trim().is_empty() {
            return Err(ChannelError::MissingMessageType);
        }

        let collector = NotificationCollector::new();
        self.deliver(message, &collector).await;
        Ok(collector.into_notifications())
    }
}
