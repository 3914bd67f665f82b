//! UpdateClassSessionHandler - edits a session and starts its re-verification.

use std::sync::Arc;

use tracing::info;

use crate::application::{ClassSessionStore, LockRegistry};
use crate::domain::class_session::{
    validate_address, BatchInfo, ClassSession, ClassSessionError, GeoPoint, Material,
    SessionUpdated,
};
use crate::domain::foundation::{ClassSessionId, CommandMetadata, FileId, Timestamp, UserId};
use crate::domain::scheduling::{Interval, SlotLimits};
use crate::ports::{ClassReader, ClassSessionReader, FileStorage, FileUpload};

use super::{authorize_tutor, discard_uploads};

/// Command to change a session. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct UpdateClassSessionCommand {
    pub class_session_id: ClassSessionId,
    pub requester: UserId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tutor_feedback: Option<String>,
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
    pub is_online: Option<bool>,
    pub address: Option<String>,
    pub ward_id: Option<String>,
    pub location: Option<Option<GeoPoint>>,
    pub is_cancelled: Option<bool>,
    pub use_class_default_address: bool,
    /// Uploaded and appended to the session materials.
    pub files: Vec<FileUpload>,
}

impl UpdateClassSessionCommand {
    pub fn new(class_session_id: ClassSessionId, requester: UserId) -> Self {
        Self {
            class_session_id,
            requester,
            ..Default::default()
        }
    }

    fn changes(&self) -> SessionUpdated {
        SessionUpdated {
            title: self.title.clone(),
            description: self.description.clone(),
            tutor_feedback: self.tutor_feedback.clone(),
            start: self.start,
            end: self.end,
            is_online: self.is_online,
            address: self.address.clone(),
            ward_id: self.ward_id.clone(),
            location: self.location,
            is_cancelled: self.is_cancelled,
            ..Default::default()
        }
    }
}

/// Handler for updating class sessions.
pub struct UpdateClassSessionHandler {
    store: Arc<ClassSessionStore>,
    locks: Arc<LockRegistry>,
    classes: Arc<dyn ClassReader>,
    schedule: Arc<dyn ClassSessionReader>,
    files: Arc<dyn FileStorage>,
    limits: SlotLimits,
}

impl UpdateClassSessionHandler {
    pub fn new(
        store: Arc<ClassSessionStore>,
        locks: Arc<LockRegistry>,
        classes: Arc<dyn ClassReader>,
        schedule: Arc<dyn ClassSessionReader>,
        files: Arc<dyn FileStorage>,
        limits: SlotLimits,
    ) -> Self {
        Self {
            store,
            locks,
            classes,
            schedule,
            files,
            limits,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateClassSessionCommand,
        metadata: CommandMetadata,
    ) -> Result<ClassSession, ClassSessionError> {
        let id = cmd.class_session_id;
        let guard = self.locks.acquire(id).await?;

        // 1. Load and check the session may change
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

        let mut changes = cmd.changes();
        if changes == SessionUpdated::default()
            && cmd.files.is_empty()
            && !cmd.use_class_default_address
        {
            return Ok(session);
        }

        // 2. Validate against the merged state
        let now = Timestamp::now();
        if changes.touches_time() {
            self.validate_schedule(&session, &changes).await?;
        }
        if changes.touches_address() || cmd.use_class_default_address {
            resolve_location(&session, &mut changes, cmd.use_class_default_address)?;
        }
        if changes.is_cancelled == Some(true) && !session.is_cancelled() && session.has_ended(now) {
            return Err(ClassSessionError::validation(
                "is_cancelled",
                "an ended session cannot be cancelled",
            ));
        }

        // 3. New materials
        let mut uploaded: Vec<FileId> = Vec::new();
        if !cmd.files.is_empty() {
            let stored = self.files.upload_multiple_files(cmd.files).await?;
            uploaded = stored.iter().map(|file| file.id.clone()).collect();
            let mut materials = session.materials().to_vec();
            materials.extend(
                stored
                    .into_iter()
                    .map(|file| Material::new(file.id, file.description)),
            );
            changes.materials = Some(materials);
        }

        // 4. Record the update and enter the update phase
        if changes
            .tutor_feedback
            .as_deref()
            .is_some_and(|feedback| feedback != session.tutor_feedback())
        {
            changes.feedback_updated_at = Some(Some(now));
        }
        changes.updated_at = Some(now);
        session.update(changes);
        session.transition_verification(session.verification().begin_update());

        let envelopes = match self.store.commit(&mut session, BatchInfo::single()).await {
            Ok(envelopes) => envelopes,
            Err(e) => {
                discard_uploads(self.files.as_ref(), &uploaded).await;
                return Err(e);
            }
        };
        drop(guard);

        info!(class_session_id = %id, "class session updated, awaiting verification");
        self.store.publish(envelopes, &metadata).await?;
        Ok(session)
    }

    async fn validate_schedule(
        &self,
        session: &ClassSession,
        changes: &SessionUpdated,
    ) -> Result<(), ClassSessionError> {
        let interval = Interval::new(
            changes.start.unwrap_or_else(|| session.start()),
            changes.end.unwrap_or_else(|| session.end()),
        );
        if !interval.start.is_before(&interval.end) {
            return Err(ClassSessionError::validation(
                "end",
                "end must be after start",
            ));
        }
        self.limits
            .check(interval.end.duration_since(&interval.start).num_minutes())?;

        let clashes = self
            .schedule
            .schedule_for_class(session.class_id())
            .await?
            .iter()
            .any(|other| other.id != session.id() && other.interval.overlaps(&interval));
        if clashes {
            return Err(ClassSessionError::validation(
                "start",
                "session overlaps an existing session of the class",
            ));
        }
        Ok(())
    }
}

/// Applies the location invariant to the merged state, clearing the
/// address when the class default is requested.
fn resolve_location(
    session: &ClassSession,
    changes: &mut SessionUpdated,
    use_class_default_address: bool,
) -> Result<(), ClassSessionError> {
    let is_online = changes.is_online.unwrap_or_else(|| session.is_online());
    if use_class_default_address && !is_online {
        changes.address = Some(String::new());
        changes.ward_id = Some(String::new());
        changes.location = Some(None);
        return Ok(());
    }

    let address = changes.address.as_deref().unwrap_or_else(|| session.address());
    let ward_id = changes.ward_id.as_deref().unwrap_or_else(|| session.ward_id());
    validate_address(is_online, address, ward_id, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::class_session::test_support::{
        limits, tutor_id, Harness,
    };
    use crate::domain::class_session::{CreateStatus, UpdateStatus};

    fn handler(h: &Harness) -> UpdateClassSessionHandler {
        UpdateClassSessionHandler::new(
            h.store.clone(),
            h.locks.clone(),
            h.projection.clone(),
            h.projection.clone(),
            h.files.clone(),
            limits(),
        )
    }

    fn tomorrow() -> Timestamp {
        Timestamp::now().add_days(1)
    }

    #[tokio::test]
    async fn update_enters_update_pending_and_resets_tutor_only() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.title = Some("Integrals".to_string());
        let updated = handler(&h).handle(cmd, CommandMetadata::new()).await.unwrap();

        assert_eq!(updated.title(), "Integrals");
        assert_eq!(updated.create_status(), CreateStatus::Created);
        assert_eq!(updated.update_status(), UpdateStatus::UpdatePending);
        assert!(!updated.tutor_verified());
        assert!(updated.class_verified());
        assert_eq!(h.store.load(session.id()).await.unwrap(), updated);
        assert!(h.bus.has_event("class_session.updated"));
        assert!(h.bus.has_event("class_session.verification_updated"));
        assert_eq!(h.locks.active_locks(), 0);
    }

    #[tokio::test]
    async fn unrecorded_update_deletes_its_uploads() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;
        h.log.set_unavailable(true);

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.files = vec![FileUpload {
            file_name: "notes.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            description: "Notes".to_string(),
            content: vec![1],
        }];
        let result = handler(&h).handle(cmd, CommandMetadata::new()).await;

        assert!(matches!(result, Err(ClassSessionError::Infrastructure(_))));
        assert_eq!(h.files.file_count().await, 0);
        assert_eq!(h.files.deleted_ids().await.len(), 1);
        assert_eq!(h.log.stream_len(session.id()).await, 2);
        assert_eq!(h.locks.active_locks(), 0);
    }

    #[tokio::test]
    async fn update_while_pending_is_rejected() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;
        let mut first = UpdateClassSessionCommand::new(session.id(), tutor_id());
        first.title = Some("First".to_string());
        handler(&h).handle(first, CommandMetadata::new()).await.unwrap();

        let mut second = UpdateClassSessionCommand::new(session.id(), tutor_id());
        second.title = Some("Second".to_string());
        let result = handler(&h).handle(second, CommandMetadata::new()).await;

        assert!(matches!(result, Err(ClassSessionError::InvalidState(_))));
    }

    #[tokio::test]
    async fn overlapping_new_time_is_rejected() {
        let h = Harness::new();
        h.seed_class().await;
        let start = tomorrow();
        h.seed_session(start, 60).await;
        let other = h.seed_session(start.plus_minutes(120), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(other.id(), tutor_id());
        cmd.start = Some(start.plus_minutes(30));
        let result = handler(&h).handle(cmd, CommandMetadata::new()).await;

        assert!(matches!(
            result,
            Err(ClassSessionError::ValidationFailed { ref field, .. }) if field == "start"
        ));
        assert_eq!(h.log.stream_len(other.id()).await, 2);
    }

    #[tokio::test]
    async fn moving_within_own_slot_is_allowed() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.start = Some(session.start().plus_minutes(15));
        cmd.end = Some(session.end().plus_minutes(15));

        assert!(handler(&h).handle(cmd, CommandMetadata::new()).await.is_ok());
    }

    #[tokio::test]
    async fn too_short_duration_is_rejected() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.end = Some(session.start().plus_minutes(20));
        let result = handler(&h).handle(cmd, CommandMetadata::new()).await;

        assert!(matches!(
            result,
            Err(ClassSessionError::ValidationFailed { ref field, .. }) if field == "duration_minutes"
        ));
    }

    #[tokio::test]
    async fn going_in_person_requires_address() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.is_online = Some(false);
        let result = handler(&h).handle(cmd, CommandMetadata::new()).await;

        assert!(matches!(
            result,
            Err(ClassSessionError::ValidationFailed { ref field, .. }) if field == "address"
        ));
    }

    #[tokio::test]
    async fn ended_session_cannot_be_cancelled() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(Timestamp::now().add_days(-1), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.is_cancelled = Some(true);
        let result = handler(&h).handle(cmd, CommandMetadata::new()).await;

        assert!(matches!(
            result,
            Err(ClassSessionError::ValidationFailed { ref field, .. }) if field == "is_cancelled"
        ));
    }

    #[tokio::test]
    async fn feedback_change_stamps_feedback_time() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.tutor_feedback = Some("Great progress".to_string());
        let updated = handler(&h).handle(cmd, CommandMetadata::new()).await.unwrap();

        assert_eq!(updated.tutor_feedback(), "Great progress");
        assert!(updated.feedback_updated_at().is_some());
    }

    #[tokio::test]
    async fn uploaded_files_are_appended() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;

        let mut cmd = UpdateClassSessionCommand::new(session.id(), tutor_id());
        cmd.files = vec![FileUpload {
            file_name: "worksheet.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            description: "Worksheet".to_string(),
            content: vec![7],
        }];
        let updated = handler(&h).handle(cmd, CommandMetadata::new()).await.unwrap();

        assert_eq!(updated.materials().len(), 1);
        assert!(h.files.contains(&updated.materials()[0].id).await);
    }

    #[tokio::test]
    async fn other_tutor_is_forbidden() {
        let h = Harness::new();
        h.seed_class().await;
        let session = h.seed_session(tomorrow(), 60).await;

        let mut cmd =
            UpdateClassSessionCommand::new(session.id(), UserId::new("tutor-2").unwrap());
        cmd.title = Some("Hijacked".to_string());
        let result = handler(&h).handle(cmd, CommandMetadata::new()).await;

        assert!(matches!(result, Err(ClassSessionError::Forbidden)));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let h = Harness::new();
        let id = ClassSessionId::new();

        let result = handler(&h)
            .handle(UpdateClassSessionCommand::new(id, tutor_id()), CommandMetadata::new())
            .await;

        assert!(matches!(result, Err(ClassSessionError::NotFound(missing)) if missing == id));
    }
}
