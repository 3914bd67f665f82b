//! In-process event bus.
//!
//! `publish` records the envelope, then awaits every handler subscribed to
//! its type before returning. A handler that publishes in turn is delivered
//! depth-first. Keeps the full history for inspection.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

type Routes = HashMap<String, Vec<Arc<dyn EventHandler>>>;

/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.subscribe(event_types::TUTOR_VERIFIED, listener);
/// bus.publish(envelope).await?;
/// assert!(bus.has_event(event_types::TUTOR_VERIFIED));
/// ```
#[derive(Default)]
pub struct InMemoryEventBus {
    routes: RwLock<Routes>,
    history: RwLock<Vec<EventEnvelope>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }

    pub fn event_count(&self) -> usize {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    /// Every handler runs even if an earlier one fails; failures are
    /// reported together.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        self.history
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());

        let handlers = self.handlers_for(&event.event_type);
        if handlers.is_empty() {
            debug!(event_type = %event.event_type, "no subscribers");
        }

        let mut failures = Vec::new();
        for handler in handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                warn!(
                    handler = handler.name(),
                    event_type = %event.event_type,
                    event_id = %event.event_id,
                    error = %e,
                    "event handler failed"
                );
                failures.push(format!("{}: {}", handler.name(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", failures.join(", ")),
            ))
        }
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.subscribe_all(&[event_type], handler);
    }

    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        for event_type in event_types {
            routes
                .entry((*event_type).to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, "s-1", "ClassSession", json!({}))
    }

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for Counter {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Counter"
        }
    }

    struct Failing;

    #[async_trait]
    impl EventHandler for Failing {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "boom"))
        }

        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    /// Publishes a follow-up for every event it receives.
    struct Relay {
        bus: Arc<InMemoryEventBus>,
    }

    #[async_trait]
    impl EventHandler for Relay {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            self.bus.publish(envelope("follow_up")).await
        }

        fn name(&self) -> &'static str {
            "Relay"
        }
    }

    #[tokio::test]
    async fn records_history_by_type() {
        let bus = InMemoryEventBus::new();

        bus.publish_all(vec![
            envelope("class_session.created"),
            envelope("class_session.updated"),
            envelope("class_session.updated"),
        ])
        .await
        .unwrap();

        assert_eq!(bus.event_count(), 3);
        assert_eq!(bus.events_of_type("class_session.updated").len(), 2);
        assert!(!bus.has_event("class_session.deleted"));
    }

    #[tokio::test]
    async fn delivers_only_subscribed_types() {
        let bus = InMemoryEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.subscribe_all(&["class.created", "class.deleted"], Arc::new(Counter(counter.clone())));
        bus.subscribe("class.created", Arc::new(Counter(counter.clone())));

        for event_type in ["class.created", "class.deleted", "class_application.updated"] {
            bus.publish(envelope(event_type)).await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn nested_publish_is_delivered_before_returning() {
        let bus = Arc::new(InMemoryEventBus::new());
        let counter = Arc::new(AtomicUsize::new(0));
        bus.subscribe("trigger", Arc::new(Relay { bus: bus.clone() }));
        bus.subscribe("follow_up", Arc::new(Counter(counter.clone())));

        bus.publish(envelope("trigger")).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let order: Vec<String> = bus
            .published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(order, vec!["trigger", "follow_up"]);
    }

    #[tokio::test]
    async fn failing_handler_does_not_starve_the_rest() {
        let bus = InMemoryEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.subscribe("x", Arc::new(Failing));
        bus.subscribe("x", Arc::new(Counter(counter.clone())));

        let err = bus.publish(envelope("x")).await.unwrap_err();

        assert!(err.message.contains("Failing"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(bus.event_count(), 1);
    }
}
