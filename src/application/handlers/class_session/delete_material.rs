//! DeleteMaterialHandler - detaches one file from a session.
//!
//! The file itself is deleted once the resulting update is verified.

use std::sync::Arc;

use tracing::info;

use crate::application::{ClassSessionStore, LockRegistry};
use crate::domain::class_session::{BatchInfo, ClassSession, ClassSessionError, SessionUpdated};
use crate::domain::foundation::{ClassSessionId, CommandMetadata, FileId, Timestamp, UserId};
use crate::ports::ClassReader;

use super::authorize_tutor;

#[derive(Debug, Clone)]
pub struct DeleteMaterialCommand {
    pub class_session_id: ClassSessionId,
    pub file_id: FileId,
    pub requester: UserId,
}

pub struct DeleteMaterialHandler {
    store: Arc<ClassSessionStore>,
    locks: Arc<LockRegistry>,
    classes: Arc<dyn ClassReader>,
}

impl DeleteMaterialHandler {
    pub fn new(
        store: Arc<ClassSessionStore>,
        locks: Arc<LockRegistry>,
        classes: Arc<dyn ClassReader>,
    ) -> Self {
        Self {
            store,
            locks,
            classes,
        }
    }

    pub async fn handle(
        &self,
        cmd: DeleteMaterialCommand,
        metadata: CommandMetadata,
    ) -> Result<ClassSession, ClassSessionError> {
        let id = cmd.class_session_id;
        let guard = self.locks.acquire(id).await?;

        let mut session = self.store.load(id).await?;
        if session.is_deleted() {
            return Err(ClassSessionError::not_found(id));
        }
        authorize_tutor(self.classes.as_ref(), &session, &cmd.requester).await?;
        if !session.verification().is_steady() {
            return Err(ClassSessionError::invalid_state(
                "class session is waiting for verification",
            ));
        }
        if !session.materials().iter().any(|m| m.id == cmd.file_id) {
            return Err(ClassSessionError::MaterialNotFound(cmd.file_id));
        }

        let remaining = session
            .materials()
            .iter()
            .filter(|m| m.id != cmd.file_id)
            .cloned()
            .collect();
        session.update(SessionUpdated {
            materials: Some(remaining),
            updated_at: Some(Timestamp::now()),
            ..Default::default()
        });
        session.transition_verification(session.verification().begin_update());

        let envelopes = self.store.commit(&mut session, BatchInfo::single()).await?;
        drop(guard);

        info!(class_session_id = %id, file_id = %cmd.file_id, "material detached");
        self.store.publish(envelopes, &metadata).await?;
        Ok(session)
    }
}
