//! ApplyDefaultAddressHandler - fills in the class default address.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::application::{ClassSessionStore, LockRegistry};
use crate::domain::class_session::{
    event_types, AddressResolved, BatchInfo, ClassSessionError, DefaultAddressReturned,
};
use crate::domain::foundation::{CommandMetadata, DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventHandler;

pub struct ApplyDefaultAddressHandler {
    store: Arc<ClassSessionStore>,
    locks: Arc<LockRegistry>,
}

impl ApplyDefaultAddressHandler {
    pub fn new(store: Arc<ClassSessionStore>, locks: Arc<LockRegistry>) -> Self {
        Self { store, locks }
    }

    /// Returns false when the session no longer waits for an address.
    pub async fn handle(
        &self,
        answer: DefaultAddressReturned,
        metadata: CommandMetadata,
    ) -> Result<bool, ClassSessionError> {
        let id = answer.class_session_id;
        let guard = self.locks.acquire(id).await?;

        let mut session = self.store.load(id).await?;
        if session.is_deleted() || !session.is_address_pending() {
            info!(class_session_id = %id, "default address not needed, ignored");
            return Ok(false);
        }

        session.resolve_address(AddressResolved {
            is_online: answer.is_online,
            address: answer.address,
            ward_id: answer.ward_id,
            location: answer.location,
        });
        let envelopes = self.store.commit(&mut session, BatchInfo::single()).await?;
        drop(guard);

        info!(class_session_id = %id, "class default address applied");
        self.store.publish(envelopes, &metadata).await?;
        Ok(true)
    }
}

/// Feeds `default_address_returned` events into the handler.
pub struct DefaultAddressListener {
    handler: Arc<ApplyDefaultAddressHandler>,
}

impl DefaultAddressListener {
    pub fn new(handler: Arc<ApplyDefaultAddressHandler>) -> Self {
        Self { handler }
    }

    pub fn event_type() -> &'static str {
        event_types::DEFAULT_ADDRESS_RETURNED
    }
}

#[async_trait]
impl EventHandler for DefaultAddressListener {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let answer: DefaultAddressReturned = event
            .payload_as()
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;

        self.handler
            .handle(answer, CommandMetadata::caused_by(&event))
            .await
            .map(|_| ())
            .map_err(|e| {
                error!(event_id = %event.event_id, error = %e, "failed to apply default address");
                DomainError::from(e)
            })
    }

    fn name(&self) -> &'static str {
        "DefaultAddressListener"
    }
}
