//! In-memory wiring shared by the class session handler tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;

use crate::adapters::{InMemoryEventBus, InMemoryEventLog, InMemoryFileStorage, InMemoryReadProjection};
use crate::application::{ClassSessionEventDispatcher, ClassSessionStore, LockRegistry};
use crate::domain::class::ClassRecord;
use crate::domain::class_session::{
    BatchInfo, ClassSession, CreateStatus, Material, NewClassSession, UpdateStatus,
    VerificationState,
};
use crate::domain::foundation::{ClassId, FileId, Timestamp, UserId};
use crate::domain::scheduling::{RecurrenceSettings, SlotLimits};
use crate::ports::{ClassDirectory, ClassSessionProjection, ClassSessionView};

pub(crate) struct Harness {
    pub log: Arc<InMemoryEventLog>,
    pub bus: Arc<InMemoryEventBus>,
    pub projection: Arc<InMemoryReadProjection>,
    pub files: Arc<InMemoryFileStorage>,
    pub store: Arc<ClassSessionStore>,
    pub locks: Arc<LockRegistry>,
}

impl Harness {
    pub fn new() -> Self {
        let log = Arc::new(InMemoryEventLog::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let dispatcher = Arc::new(ClassSessionEventDispatcher::new(bus.clone()));
        Self {
            store: Arc::new(ClassSessionStore::new(log.clone(), dispatcher)),
            log,
            bus,
            projection: Arc::new(InMemoryReadProjection::new()),
            files: Arc::new(InMemoryFileStorage::new()),
            locks: Arc::new(LockRegistry::new(Duration::from_secs(2))),
        }
    }

    pub async fn seed_class(&self) {
        self.projection
            .insert_class(ClassRecord::new(class_id(), student_id()).with_tutor(tutor_id()))
            .await
            .unwrap();
    }

    /// Commits a session whose creation is already verified and mirrors it
    /// into the projection.
    pub async fn seed_session(&self, start: Timestamp, minutes: i64) -> ClassSession {
        self.seed_with(new_session(start, minutes)).await
    }

    pub async fn seed_with(&self, data: NewClassSession) -> ClassSession {
        let mut session = ClassSession::create_new(data);
        session.transition_verification(VerificationState {
            create_status: CreateStatus::Created,
            update_status: UpdateStatus::Updated,
            tutor_verified: true,
            class_verified: true,
        });
        self.store
            .commit(&mut session, BatchInfo::single())
            .await
            .unwrap();
        self.projection
            .upsert(ClassSessionView::from_session(&session))
            .await
            .unwrap();
        session
    }
}

pub(crate) fn tutor_id() -> UserId {
    UserId::new("tutor-1").unwrap()
}

pub(crate) fn student_id() -> UserId {
    UserId::new("student-1").unwrap()
}

pub(crate) fn class_id() -> ClassId {
    ClassId::new("class-1").unwrap()
}

pub(crate) fn material(id: &str) -> Material {
    Material::new(FileId::new(id).unwrap(), format!("{} handout", id))
}

pub(crate) fn new_session(start: Timestamp, minutes: i64) -> NewClassSession {
    NewClassSession {
        tutor_id: tutor_id(),
        class_id: class_id(),
        title: "Calculus".to_string(),
        description: "Limits".to_string(),
        start,
        end: start.plus_minutes(minutes),
        is_online: true,
        address: String::new(),
        ward_id: String::new(),
        location: None,
        materials: Vec::new(),
    }
}

pub(crate) fn limits() -> SlotLimits {
    SlotLimits {
        min_session_minutes: 30,
        max_session_hours: 24,
    }
}

pub(crate) fn recurrence() -> RecurrenceSettings {
    RecurrenceSettings {
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        max_generation_attempts: 100,
    }
}
