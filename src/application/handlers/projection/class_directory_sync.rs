//! ClassDirectorySync - mirrors class ownership from class service events.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::class::{
    event_types, ApplicationStatus, ClassApplicationUpdated, ClassCreated, ClassDeleted,
    ClassRecord,
};
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{ClassDirectory, EventHandler};

pub struct ClassDirectorySync {
    directory: Arc<dyn ClassDirectory>,
}

impl ClassDirectorySync {
    pub fn new(directory: Arc<dyn ClassDirectory>) -> Self {
        Self { directory }
    }

    pub fn event_types() -> [&'static str; 3] {
        [
            event_types::CLASS_CREATED,
            event_types::CLASS_DELETED,
            event_types::CLASS_APPLICATION_UPDATED,
        ]
    }
}

fn parse<T: for<'de> serde::Deserialize<'de>>(event: &EventEnvelope) -> Result<T, DomainError> {
    event
        .payload_as()
        .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))
}

#[async_trait]
impl EventHandler for ClassDirectorySync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        match event.event_type.as_str() {
            event_types::CLASS_CREATED => {
                let created: ClassCreated = parse(&event)?;
                info!(class_id = %created.class_id, "class recorded");
                self.directory
                    .insert_class(ClassRecord::new(created.class_id, created.student_id))
                    .await
            }
            event_types::CLASS_DELETED => {
                let deleted: ClassDeleted = parse(&event)?;
                info!(class_id = %deleted.class_id, "class removed");
                self.directory.remove_class(&deleted.class_id).await
            }
            event_types::CLASS_APPLICATION_UPDATED => {
                let application: ClassApplicationUpdated = parse(&event)?;
                if application.status != ApplicationStatus::Approved {
                    debug!(class_id = %application.class_id, "application not approved, ignored");
                    return Ok(());
                }
                info!(
                    class_id = %application.class_id,
                    tutor_id = %application.tutor_id,
                    "tutor of record assigned"
                );
                self.directory
                    .assign_tutor(&application.class_id, application.tutor_id)
                    .await
            }
            other => Err(DomainError::new(
                ErrorCode::ValidationFailed,
                format!("Unexpected event type: {}", other),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "ClassDirectorySync"
    }
}
