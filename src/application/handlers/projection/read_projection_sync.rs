//! ReadProjectionSync - keeps the denormalized session records current.
//!
//! Integration event payloads are only a trigger. The record is rebuilt from
//! the event log so that out-of-order or duplicate deliveries converge.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ClassSessionStore;
use crate::domain::class_session::event_types;
use crate::domain::foundation::{ClassSessionId, DomainError, ErrorCode, EventEnvelope};
use crate::ports::{ClassSessionProjection, ClassSessionView, EventHandler};

pub struct ReadProjectionSync {
    store: Arc<ClassSessionStore>,
    projection: Arc<dyn ClassSessionProjection>,
}

impl ReadProjectionSync {
    pub fn new(store: Arc<ClassSessionStore>, projection: Arc<dyn ClassSessionProjection>) -> Self {
        Self { store, projection }
    }

    pub fn event_types() -> [&'static str; 5] {
        [
            event_types::CREATED,
            event_types::UPDATED,
            event_types::DELETED,
            event_types::VERIFICATION_UPDATED,
            event_types::ADDRESS_RESOLVED,
        ]
    }
}

#[async_trait]
impl EventHandler for ReadProjectionSync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let id: ClassSessionId = event.aggregate_id.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Invalid class session id: {}", event.aggregate_id),
            )
        })?;

        let session = self.store.load(id).await?;
        if session.is_deleted() {
            debug!(class_session_id = %id, "removing deleted session from projection");
            return self.projection.remove(id).await;
        }

        debug!(class_session_id = %id, version = session.version(), "projecting class session");
        self.projection
            .upsert(ClassSessionView::from_session(&session))
            .await
    }

    fn name(&self) -> &'static str {
        "ReadProjectionSync"
    }
}
