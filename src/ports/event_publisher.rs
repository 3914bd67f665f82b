//! EventPublisher port - outbound integration events.
//!
//! Verification requests, projection refreshes and address queries all leave
//! the service through this port. The transport behind it is not our concern.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing integration events.
///
/// Callers publish only after the events' source facts are committed to the
/// event log. Delivery is at-least-once; consumers must tolerate duplicates.
///
/// # Example
///
/// ```ignore
/// let envelope = ClassSessionCreated::new(&session, BatchInfo::single()).to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Stops at the first failure; earlier events stay published.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}

    #[test]
    fn event_publisher_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn EventPublisher>();
    }
}
