//! EventSubscriber port - inbound event delivery.
//!
//! Verification results, address answers and class changes arrive as
//! events; handlers register for the types they care about.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for one or more event types.
///
/// Handlers must be idempotent: the same envelope may be delivered again.
///
/// # Example
///
/// ```ignore
/// #[async_trait]
/// impl EventHandler for ReadProjectionSync {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let id: ClassSessionId = event.aggregate_id.parse()?;
///         // reload from the event log and upsert...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "ReadProjectionSync"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for registering event handlers.
///
/// ```ignore
/// subscriber.subscribe(event_types::TUTOR_VERIFIED, verification_handler.clone());
/// subscriber.subscribe_all(&[CLASS_CREATED, CLASS_DELETED], class_directory);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe one handler to several event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}
