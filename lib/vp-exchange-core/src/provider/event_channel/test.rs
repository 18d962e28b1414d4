use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use super::{
    ChannelError, EventChannel, EventProcessor, LocalEventBus, NotificationCollector, Notifier,
};
use crate::model::message::{Message, Notification, Outcome};

struct EchoProcessor {
    name: String,
    handles: String,
    calls: AtomicUsize,
}

impl EchoProcessor {
    fn new(name: &str, handles: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_owned(),
            handles: handles.to_owned(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl EventProcessor for EchoProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle_event(&self, message: Message, notifier: &dyn Notifier) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if message.r#type != self.handles {
            return Outcome::Ignored;
        }

        let text = message
            .property("text")
            .and_then(|value| value.as_str())
            .unwrap_or_default();
        notifier.notify(Notification::failure(format!("{}: {text}", self.name)));
        Outcome::Success
    }
}

#[test]
fn test_closure_is_notifier() {
    let collector = NotificationCollector::new();
    let forward = |notification: Notification| collector.notify(notification);

    forward.notify(Notification::created());
    forward.notify(Notification::failure("second"));

    let notifications = collector.into_notifications();
    assert_eq!(notifications, vec![Notification::created(), Notification::failure("second")]);
}

#[tokio::test]
async fn test_bus_fans_out_in_registration_order() {
    let bus = LocalEventBus::new();
    let first = EchoProcessor::new("first", "echo");
    let second = EchoProcessor::new("second", "echo");
    let other = EchoProcessor::new("other", "something-else");
    bus.register(first.clone()).await;
    bus.register(other.clone()).await;
    bus.register(second.clone()).await;

    let message = Message::new("echo").with_property("text", json!("hello"));
    let collector = NotificationCollector::new();
    let outcomes = bus.deliver(message, &collector).await;

    assert_eq!(outcomes, vec![Outcome::Success, Outcome::Ignored, Outcome::Success]);
    assert_eq!(other.calls.load(Ordering::SeqCst), 1);

    let errors: Vec<String> = collector
        .into_notifications()
        .iter()
        .filter_map(|notification| notification.error_message().map(str::to_owned))
        .collect();
    assert_eq!(errors, vec!["first: hello", "second: hello"]);
}

#[tokio::test]
async fn test_dispatch_returns_emitted_notifications() {
    let bus = LocalEventBus::new();
    bus.register(EchoProcessor::new("echo", "echo")).await;

    let notifications = bus
        .dispatch(Message::new("echo").with_property("text", json!("hi")))
        .await
        .unwrap();
    assert_eq!(notifications, vec![Notification::failure("echo: hi")]);

    let notifications = bus.dispatch(Message::new("unknown")).await.unwrap();
    assert!(notifications.is_empty());
}

#[tokio::test]
async fn test_dispatch_without_type_is_rejected() {
    let bus = LocalEventBus::new();
    let processor = EchoProcessor::new("echo", "say");
    bus.register(processor.clone()).await;

    let result = bus.dispatch(Message::new(" ")).await;

    assert!(matches!(result, Err(ChannelError::MissingMessageType)));
    assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
}
