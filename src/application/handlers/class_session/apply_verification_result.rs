//! Verification coordinator.
//!
//! Applies one tutor or class verifier answer to a session under its lock:
//! 1. Records the answer and advances the pending axis
//! 2. Reverts a failed update in the same append that records the failure
//! 3. Cleans up files orphaned by a completed or reverted update
//! 4. Asks for the class default address once a session with a pending
//!    address completes a phase
//!
//! Answers for deleted or settled sessions are ignored.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::application::{ClassSessionStore, LockRegistry};
use crate::domain::class_session::{
    event_types, materials_before_last_update, orphaned_files, revert_last_update,
    BatchInfo, ClassSessionError, CreateStatus, VerificationResult, VerificationState, Verifier,
};
use crate::domain::foundation::{
    CommandMetadata, DomainError, ErrorCode, EventEnvelope, FileId,
};
use crate::ports::{EventHandler, FileStorage};

/// One verifier answer.
#[derive(Debug, Clone)]
pub struct ApplyVerificationResultCommand {
    pub verifier: Verifier,
    pub result: VerificationResult,
}

/// What the answer led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Session deleted or not waiting on a verifier.
    Ignored,
    /// Recorded; still waiting on the other verifier.
    Pending,
    CreationCompleted,
    CreationFailed,
    UpdateCompleted,
    /// The update was rejected and rolled back.
    UpdateReverted,
}

pub struct ApplyVerificationResultHandler {
    store: Arc<ClassSessionStore>,
    locks: Arc<LockRegistry>,
    files: Arc<dyn FileStorage>,
}

impl ApplyVerificationResultHandler {
    pub fn new(
        store: Arc<ClassSessionStore>,
        locks: Arc<LockRegistry>,
        files: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            store,
            locks,
            files,
        }
    }

    pub async fn handle(
        &self,
        cmd: ApplyVerificationResultCommand,
        metadata: CommandMetadata,
    ) -> Result<VerificationOutcome, ClassSessionError> {
        let id = cmd.result.class_session_id;
        let guard = self.locks.acquire(id).await?;

        // 1. Load with history; a revert replays it
        let (mut session, history) = self.store.load_with_history(id).await?;
        if session.is_deleted() {
            info!(class_session_id = %id, verifier = %cmd.verifier, "verification for deleted session ignored");
            return Ok(VerificationOutcome::Ignored);
        }
        let before = session.verification();
        if !before.is_in_flight() {
            warn!(class_session_id = %id, verifier = %cmd.verifier, "verification for settled session ignored");
            return Ok(VerificationOutcome::Ignored);
        }

        // 2. Work out the whole transition before anything is appended
        if !cmd.result.is_valid {
            warn!(class_session_id = %id, verifier = %cmd.verifier, "verification rejected");
        }
        let next = before.record_result(cmd.verifier, cmd.result.is_valid);
        let revert = if before.failed_update(&next) {
            Some(revert_last_update(id, &history)?)
        } else {
            None
        };
        let detached = if before.completed_update(&next) {
            Some(materials_before_last_update(id, &history)?)
        } else {
            None
        };

        // 3. Record it, the failure and its rollback in one append
        session.transition_verification(next);
        let mut orphans: Vec<FileId> = Vec::new();
        let outcome = if let Some(revert) = revert {
            let failed_materials = session.materials().to_vec();
            session.update(revert.restore);
            session.transition_verification(VerificationState {
                create_status: session.create_status(),
                ..revert.prior.verification()
            });
            orphans = orphaned_files(&failed_materials, session.materials());
            warn!(class_session_id = %id, "rejected update reverted");
            VerificationOutcome::UpdateReverted
        } else if let Some(previous) = detached {
            orphans = orphaned_files(&previous, session.materials());
            info!(class_session_id = %id, "class session update verified");
            VerificationOutcome::UpdateCompleted
        } else if before.completed_creation(&next) {
            info!(class_session_id = %id, "class session creation verified");
            VerificationOutcome::CreationCompleted
        } else if before.create_status == CreateStatus::CreatePending
            && next.create_status == CreateStatus::Failed
        {
            VerificationOutcome::CreationFailed
        } else {
            VerificationOutcome::Pending
        };

        // A revert can put back an empty address, so it asks again too
        let settled = matches!(
            outcome,
            VerificationOutcome::CreationCompleted
                | VerificationOutcome::UpdateCompleted
                | VerificationOutcome::UpdateReverted
        );
        let address_query = if settled
            && session.create_status() == CreateStatus::Created
            && session.is_address_pending()
        {
            Some(self.store.dispatcher().default_address_query(&session)?)
        } else {
            None
        };

        let mut envelopes = self.store.commit(&mut session, BatchInfo::single()).await?;
        envelopes.extend(address_query);
        drop(guard);

        // 4. Side effects once the lock is released
        self.store.publish(envelopes, &metadata).await?;
        if !orphans.is_empty() {
            if let Err(e) = self.files.delete_multiple_files(&orphans).await {
                error!(class_session_id = %id, error = %e, "failed to delete orphaned materials");
            }
        }
        Ok(outcome)
    }
}

/// Feeds `tutor_verified` and `class_verified` events into the coordinator.
pub struct VerificationResultListener {
    handler: Arc<ApplyVerificationResultHandler>,
}

impl VerificationResultListener {
    pub fn new(handler: Arc<ApplyVerificationResultHandler>) -> Self {
        Self { handler }
    }

    /// Event types this listener must be subscribed to.
    pub fn event_types() -> [&'static str; 2] {
        [event_types::TUTOR_VERIFIED, event_types::CLASS_VERIFIED]
    }
}

#[async_trait]
impl EventHandler for VerificationResultListener {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let verifier = match event.event_type.as_str() {
            event_types::TUTOR_VERIFIED => Verifier::Tutor,
            event_types::CLASS_VERIFIED => Verifier::Class,
            other => {
                return Err(DomainError::new(
                    ErrorCode::ValidationFailed,
                    format!("Unexpected event type: {}", other),
                ))
            }
        };
        let result: VerificationResult = event
            .payload_as()
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;

        self.handler
            .handle(
                ApplyVerificationResultCommand { verifier, result },
                CommandMetadata::caused_by(&event),
            )
            .await
            .map(|_| ())
            .map_err(|e| {
                error!(event_id = %event.event_id, error = %e, "failed to apply verification result");
                DomainError::from(e)
            })
    }

    fn name(&self) -> &'static str {
        "VerificationResultListener"
    }
}
