//! DeleteClassSessionHandler - soft-deletes a session and drops its files.

use std::sync::Arc;

use tracing::{error, info};

use crate::application::{ClassSessionStore, LockRegistry};
use crate::domain::class_session::{BatchInfo, ClassSessionError, SessionUpdated};
use crate::domain::foundation::{ClassSessionId, CommandMetadata, FileId, Timestamp, UserId};
use crate::ports::{ClassReader, FileStorage};

use super::authorize_tutor;

/// Command to delete a session.
#[derive(Debug, Clone)]
pub struct DeleteClassSessionCommand {
    pub class_session_id: ClassSessionId,
    pub requester: UserId,
}

/// Handler for deleting class sessions.
pub struct DeleteClassSessionHandler {
    store: Arc<ClassSessionStore>,
    locks: Arc<LockRegistry>,
    classes: Arc<dyn ClassReader>,
    files: Arc<dyn FileStorage>,
}

impl DeleteClassSessionHandler {
    pub fn new(
        store: Arc<ClassSessionStore>,
        locks: Arc<LockRegistry>,
        classes: Arc<dyn ClassReader>,
        files: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            store,
            locks,
            classes,
            files,
        }
    }

    pub async fn handle(
        &self,
        cmd: DeleteClassSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<(), ClassSessionError> {
        let id = cmd.class_session_id;
        let guard = self.locks.acquire(id).await?;

        let mut session = self.store.load(id).await?;
        if session.is_deleted() {
            return Err(ClassSessionError::not_found(id));
        }
        authorize_tutor(self.classes.as_ref(), &session, &cmd.requester).await?;
        if session.verification().is_in_flight() {
            return Err(ClassSessionError::invalid_state(
                "class session is waiting for verification",
            ));
        }

        session.update(SessionUpdated {
            is_deleted: Some(true),
            updated_at: Some(Timestamp::now()),
            ..Default::default()
        });
        let envelopes = self.store.commit(&mut session, BatchInfo::single()).await?;
        let attached: Vec<FileId> = session.materials().iter().map(|m| m.id.clone()).collect();
        drop(guard);

        info!(class_session_id = %id, "class session deleted");
        self.store.publish(envelopes, &metadata).await?;

        if !attached.is_empty() {
            if let Err(e) = self.files.delete_multiple_files(&attached).await {
                error!(class_session_id = %id, error = %e, "failed to delete session materials");
            }
        }
        Ok(())
    }
}
