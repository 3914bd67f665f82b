//! CreateClassSessionsHandler - schedules one session or a weekly series.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::application::ClassSessionStore;
use crate::domain::class_session::{
    validate_address, BatchInfo, ClassSession, ClassSessionError, GeoPoint, Material,
    NewClassSession,
};
use crate::domain::foundation::{ClassId, CommandMetadata, FileId, Timestamp, UserId};
use crate::domain::scheduling::{
    plan_occurrences, sanitize_time_slots, Interval, RecurrenceRule, RecurrenceSettings,
    SlotLimits, TimeSlot,
};
use crate::ports::{ClassSessionReader, FileStorage, FileUpload};

use super::discard_uploads;

/// Command to schedule sessions for a class.
#[derive(Debug, Clone)]
pub struct CreateClassSessionsCommand {
    pub tutor_id: UserId,
    pub class_id: ClassId,
    pub title: String,
    pub description: String,
    pub is_online: bool,
    pub address: String,
    pub ward_id: String,
    pub location: Option<GeoPoint>,
    /// Leave the address empty and resolve the class default address.
    pub use_class_default_address: bool,
    pub time_slots: Vec<TimeSlot>,
    pub recurrence: RecurrenceRule,
    /// Attached to the first session.
    pub materials: Vec<FileUpload>,
}

/// Result of scheduling.
#[derive(Debug, Clone)]
pub struct CreateClassSessionsResult {
    /// Sessions recorded, in schedule order.
    pub sessions: Vec<ClassSession>,
    /// Candidates dropped because they overlapped existing sessions.
    pub skipped: usize,
    /// Set when a series stopped part way; `sessions` holds what exists.
    pub failure: Option<BatchFailure>,
}

/// Why a series stopped before all planned sessions were recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub planned: usize,
    pub error: ClassSessionError,
}

/// Handler for creating class sessions.
pub struct CreateClassSessionsHandler {
    store: Arc<ClassSessionStore>,
    schedule: Arc<dyn ClassSessionReader>,
    files: Arc<dyn FileStorage>,
    limits: SlotLimits,
    recurrence: RecurrenceSettings,
}

impl CreateClassSessionsHandler {
    pub fn new(
        store: Arc<ClassSessionStore>,
        schedule: Arc<dyn ClassSessionReader>,
        files: Arc<dyn FileStorage>,
        limits: SlotLimits,
        recurrence: RecurrenceSettings,
    ) -> Self {
        Self {
            store,
            schedule,
            files,
            limits,
            recurrence,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateClassSessionsCommand,
        metadata: CommandMetadata,
    ) -> Result<CreateClassSessionsResult, ClassSessionError> {
        // 1. Location invariant
        validate_address(
            cmd.is_online,
            &cmd.address,
            &cmd.ward_id,
            cmd.use_class_default_address,
        )?;

        // 2. Slots
        let slots = sanitize_time_slots(&cmd.time_slots, self.limits)?;

        // 3. Plan against the class's current schedule
        let existing: Vec<Interval> = self
            .schedule
            .schedule_for_class(&cmd.class_id)
            .await?
            .into_iter()
            .map(|scheduled| scheduled.interval)
            .collect();
        let plan = plan_occurrences(
            &cmd.recurrence,
            &slots,
            &self.recurrence,
            Timestamp::now(),
            |candidate| !candidate.overlaps_any(&existing),
        )?;
        if plan.skipped > 0 {
            debug!(
                class_id = %cmd.class_id,
                skipped = plan.skipped,
                "skipped overlapping recurrence candidates"
            );
        }

        // 4. Upload materials for the first session
        let materials: Vec<Material> = if cmd.materials.is_empty() {
            Vec::new()
        } else {
            self.files
                .upload_multiple_files(cmd.materials)
                .await?
                .into_iter()
                .map(|stored| Material::new(stored.id, stored.description))
                .collect()
        };
        let uploaded: Vec<FileId> = materials.iter().map(|m| m.id.clone()).collect();

        // 5. Create, commit and publish each session; stop at the first failure
        let (address, ward_id) = if cmd.is_online || !cmd.use_class_default_address {
            (cmd.address, cmd.ward_id)
        } else {
            (String::new(), String::new())
        };
        let total = plan.occurrences.len();
        let mut first_materials = Some(materials);
        let mut sessions = Vec::with_capacity(total);
        let mut failure = None;

        for (index, occurrence) in plan.occurrences.iter().enumerate() {
            let (title, description) = if index == 0 {
                (cmd.title.clone(), cmd.description.clone())
            } else {
                (format!("{} {}", cmd.title, index), String::new())
            };

            let mut session = ClassSession::create_new(NewClassSession {
                tutor_id: cmd.tutor_id.clone(),
                class_id: cmd.class_id.clone(),
                title,
                description,
                start: occurrence.interval.start,
                end: occurrence.interval.end,
                is_online: cmd.is_online,
                address: address.clone(),
                ward_id: ward_id.clone(),
                location: cmd.location,
                materials: first_materials.take().unwrap_or_default(),
            });

            let envelopes = match self.store.commit(&mut session, BatchInfo::nth(index, total)).await {
                Ok(envelopes) => envelopes,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            sessions.push(session);
            if let Err(e) = self.store.publish(envelopes, &metadata).await {
                failure = Some(e);
                break;
            }
        }

        if let Some(e) = failure {
            error!(
                class_id = %cmd.class_id,
                created = sessions.len(),
                planned = total,
                error = %e,
                "class session batch stopped"
            );
            // The uploads belong to the first session once it is recorded
            if sessions.is_empty() {
                discard_uploads(self.files.as_ref(), &uploaded).await;
                return Err(e);
            }
            return Ok(CreateClassSessionsResult {
                sessions,
                skipped: plan.skipped,
                failure: Some(BatchFailure {
                    planned: total,
                    error: e,
                }),
            });
        }

        info!(
            class_id = %cmd.class_id,
            created = sessions.len(),
            skipped = plan.skipped,
            "class sessions created"
        );

        Ok(CreateClassSessionsResult {
            sessions,
            skipped: plan.skipped,
            failure: None,
        })
    }
}
