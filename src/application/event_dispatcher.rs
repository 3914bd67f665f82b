//! Outbound integration events for committed class session changes.
//!
//! Constructed once at startup and handed to the store; nothing here is a
//! global.

use std::sync::Arc;

use tracing::{debug, error};

use crate::domain::class_session::{
    BatchInfo, ClassSession, ClassSessionAddressResolved, ClassSessionCreated,
    ClassSessionDeleted, ClassSessionEvent, ClassSessionUpdated, ClassSessionVerificationUpdated,
    DefaultAddressQueried,
};
use crate::domain::foundation::{
    CommandMetadata, DomainError, EventEnvelope, IntegrationEvent,
};
use crate::ports::EventPublisher;

/// Maps committed domain events to integration events and publishes them.
pub struct ClassSessionEventDispatcher {
    publisher: Arc<dyn EventPublisher>,
}

impl ClassSessionEventDispatcher {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    /// One integration event per committed event, built from the session
    /// state right after the commit.
    ///
    /// A soft delete is announced as a deletion, not an update.
    pub fn envelopes_for(
        &self,
        session: &ClassSession,
        committed: &[ClassSessionEvent],
        batch: BatchInfo,
    ) -> Result<Vec<EventEnvelope>, DomainError> {
        committed
            .iter()
            .map(|event| match event {
                ClassSessionEvent::Created(_) => {
                    ClassSessionCreated::new(session, batch).to_envelope()
                }
                ClassSessionEvent::Updated(update) if update.is_deleted == Some(true) => {
                    ClassSessionDeleted::new(session).to_envelope()
                }
                ClassSessionEvent::Updated(_) => ClassSessionUpdated::new(session).to_envelope(),
                ClassSessionEvent::VerificationUpdated(_) => {
                    ClassSessionVerificationUpdated::new(session).to_envelope()
                }
                ClassSessionEvent::AddressResolved(_) => {
                    ClassSessionAddressResolved::new(session).to_envelope()
                }
            })
            .collect()
    }

    /// Request for the class default address of `session`.
    pub fn default_address_query(&self, session: &ClassSession) -> Result<EventEnvelope, DomainError> {
        DefaultAddressQueried::new(session).to_envelope()
    }

    /// Publishes envelopes in order, stamped with the command's correlation.
    pub async fn publish(
        &self,
        envelopes: Vec<EventEnvelope>,
        metadata: &CommandMetadata,
    ) -> Result<(), DomainError> {
        if envelopes.is_empty() {
            return Ok(());
        }
        let stamped: Vec<EventEnvelope> = envelopes
            .into_iter()
            .map(|envelope| metadata.stamp(envelope))
            .collect();

        for envelope in &stamped {
            debug!(
                event_type = %envelope.event_type,
                class_session_id = %envelope.aggregate_id,
                "publishing integration event"
            );
        }

        self.publisher.publish_all(stamped).await.map_err(|e| {
            error!(error = %e, "failed to publish class session events");
            e
        })
    }
}
