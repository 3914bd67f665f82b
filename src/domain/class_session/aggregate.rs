//! ClassSession aggregate - event-sourced root entity for a scheduled class meeting.
//!
//! State is never set directly. Every change is expressed as a
//! [`ClassSessionEvent`], applied through a per-event reducer and queued as
//! pending until the store commits it. Replaying the same ordered events
//! always produces the same session.

use super::{
    AddressResolved, ClassSessionError, ClassSessionEvent, CreateStatus, GeoPoint, Material,
    SessionCreated, SessionUpdated, UpdateStatus, VerificationState, VerificationUpdated,
};
use crate::domain::foundation::{ClassId, ClassSessionId, Timestamp, UserId};

/// Input for scheduling a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClassSession {
    pub tutor_id: UserId,
    pub class_id: ClassId,
    pub title: String,
    pub description: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub is_online: bool,
    pub address: String,
    pub ward_id: String,
    pub location: Option<GeoPoint>,
    pub materials: Vec<Material>,
}

/// The ClassSession aggregate root.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSession {
    id: ClassSessionId,
    tutor_id: UserId,
    class_id: ClassId,
    title: String,
    description: String,
    tutor_feedback: String,
    created_at: Timestamp,
    updated_at: Timestamp,
    feedback_updated_at: Option<Timestamp>,
    start: Timestamp,
    end: Timestamp,
    is_online: bool,
    address: String,
    ward_id: String,
    location: Option<GeoPoint>,
    materials: Vec<Material>,
    is_cancelled: bool,
    is_deleted: bool,
    verification: VerificationState,
    version: u64,
    pending_events: Vec<ClassSessionEvent>,
}

impl ClassSession {
    /// Zero-valued session that replay starts from.
    fn blank(id: ClassSessionId) -> Self {
        Self {
            id,
            tutor_id: UserId::default(),
            class_id: ClassId::default(),
            title: String::new(),
            description: String::new(),
            tutor_feedback: String::new(),
            created_at: Timestamp::epoch(),
            updated_at: Timestamp::epoch(),
            feedback_updated_at: None,
            start: Timestamp::epoch(),
            end: Timestamp::epoch(),
            is_online: false,
            address: String::new(),
            ward_id: String::new(),
            location: None,
            materials: Vec::new(),
            is_cancelled: false,
            is_deleted: false,
            verification: VerificationState::default(),
            version: 0,
            pending_events: Vec::new(),
        }
    }

    /// Schedules a new session under a fresh id.
    ///
    /// The creation event is applied and left pending.
    pub fn create_new(data: NewClassSession) -> Self {
        let now = Timestamp::now();
        let mut session = Self::blank(ClassSessionId::new());
        session.record(ClassSessionEvent::Created(SessionCreated {
            tutor_id: data.tutor_id,
            class_id: data.class_id,
            title: data.title,
            description: data.description,
            start: data.start,
            end: data.end,
            is_online: data.is_online,
            address: data.address,
            ward_id: data.ward_id,
            location: data.location,
            materials: data.materials,
            created_at: now,
        }));
        session
    }

    /// Rebuilds a session from its committed history.
    ///
    /// # Errors
    ///
    /// `NotFound` when the history is empty.
    pub fn from_events(
        id: ClassSessionId,
        events: &[ClassSessionEvent],
    ) -> Result<Self, ClassSessionError> {
        if events.is_empty() {
            return Err(ClassSessionError::not_found(id));
        }
        Ok(Self::replay(id, events))
    }

    /// Folds any event slice, including an empty one, over a blank session.
    pub(crate) fn replay(id: ClassSessionId, events: &[ClassSessionEvent]) -> Self {
        let mut session = Self::blank(id);
        for event in events {
            session.apply_committed(event);
        }
        session
    }

    /// Folds one already-committed event without queuing it.
    pub(crate) fn apply_committed(&mut self, event: &ClassSessionEvent) {
        self.apply(event);
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> ClassSessionId {
        self.id
    }

    pub fn tutor_id(&self) -> &UserId {
        &self.tutor_id
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tutor_feedback(&self) -> &str {
        &self.tutor_feedback
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn feedback_updated_at(&self) -> Option<Timestamp> {
        self.feedback_updated_at
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn ward_id(&self) -> &str {
        &self.ward_id
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn create_status(&self) -> CreateStatus {
        self.verification.create_status
    }

    pub fn update_status(&self) -> UpdateStatus {
        self.verification.update_status
    }

    pub fn tutor_verified(&self) -> bool {
        self.verification.tutor_verified
    }

    pub fn class_verified(&self) -> bool {
        self.verification.class_verified
    }

    pub fn verification(&self) -> VerificationState {
        self.verification
    }

    /// Number of events folded into this session, committed or not.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pending_events(&self) -> &[ClassSessionEvent] {
        &self.pending_events
    }

    /// In-person session still waiting for the class default address.
    pub fn is_address_pending(&self) -> bool {
        !self.is_online && (self.address.trim().is_empty() || self.ward_id.trim().is_empty())
    }

    /// True once the session end lies before `now`.
    pub fn has_ended(&self, now: Timestamp) -> bool {
        self.end.is_before(&now)
    }

    /// Update that puts back this session's value for every field `reverted`
    /// set. Fields it left alone keep whatever they hold when it is applied.
    pub fn restoring(&self, reverted: &SessionUpdated) -> SessionUpdated {
        fn keep<T: Clone, U>(touched: &Option<U>, value: &T) -> Option<T> {
            touched.as_ref().map(|_| value.clone())
        }

        SessionUpdated {
            title: keep(&reverted.title, &self.title),
            description: keep(&reverted.description, &self.description),
            tutor_feedback: keep(&reverted.tutor_feedback, &self.tutor_feedback),
            start: keep(&reverted.start, &self.start),
            end: keep(&reverted.end, &self.end),
            is_online: keep(&reverted.is_online, &self.is_online),
            address: keep(&reverted.address, &self.address),
            ward_id: keep(&reverted.ward_id, &self.ward_id),
            location: keep(&reverted.location, &self.location),
            materials: keep(&reverted.materials, &self.materials),
            is_cancelled: keep(&reverted.is_cancelled, &self.is_cancelled),
            is_deleted: None,
            updated_at: keep(&reverted.updated_at, &self.updated_at),
            feedback_updated_at: keep(&reverted.feedback_updated_at, &self.feedback_updated_at),
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Commands
    // ───────────────────────────────────────────────────────────────

    /// Appends a partial content update.
    pub fn update(&mut self, changes: SessionUpdated) {
        self.record(ClassSessionEvent::Updated(changes));
    }

    /// Appends a change to the status axes or verified flags.
    pub fn update_verification(&mut self, changes: VerificationUpdated) {
        self.record(ClassSessionEvent::VerificationUpdated(changes));
    }

    /// Moves to `next`, recording only the fields that differ.
    ///
    /// Returns false when nothing changed and no event was recorded.
    pub fn transition_verification(&mut self, next: VerificationState) -> bool {
        let current = self.verification;
        let changes = VerificationUpdated {
            create_status: (next.create_status != current.create_status)
                .then_some(next.create_status),
            update_status: (next.update_status != current.update_status)
                .then_some(next.update_status),
            tutor_verified: (next.tutor_verified != current.tutor_verified)
                .then_some(next.tutor_verified),
            class_verified: (next.class_verified != current.class_verified)
                .then_some(next.class_verified),
        };
        if changes == VerificationUpdated::default() {
            return false;
        }
        self.update_verification(changes);
        true
    }

    /// Appends the class default address.
    pub fn resolve_address(&mut self, resolved: AddressResolved) {
        self.record(ClassSessionEvent::AddressResolved(resolved));
    }

    /// Drains uncommitted events.
    pub fn take_pending_events(&mut self) -> Vec<ClassSessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ───────────────────────────────────────────────────────────────
    // Event application
    // ───────────────────────────────────────────────────────────────

    fn record(&mut self, event: ClassSessionEvent) {
        self.apply(&event);
        self.pending_events.push(event);
    }

    fn apply(&mut self, event: &ClassSessionEvent) {
        match event {
            ClassSessionEvent::Created(e) => self.apply_created(e),
            ClassSessionEvent::Updated(e) => self.apply_updated(e),
            ClassSessionEvent::VerificationUpdated(e) => self.apply_verification(e),
            ClassSessionEvent::AddressResolved(e) => self.apply_address(e),
        }
        self.version += 1;
    }

    fn apply_created(&mut self, e: &SessionCreated) {
        self.tutor_id = e.tutor_id.clone();
        self.class_id = e.class_id.clone();
        self.title = e.title.clone();
        self.description = e.description.clone();
        self.start = e.start;
        self.end = e.end;
        self.is_online = e.is_online;
        self.address = e.address.clone();
        self.ward_id = e.ward_id.clone();
        self.location = e.location;
        self.materials = e.materials.clone();
        self.created_at = e.created_at;
        self.updated_at = e.created_at;
        self.verification = VerificationState {
            create_status: CreateStatus::CreatePending,
            update_status: UpdateStatus::Updated,
            tutor_verified: false,
            class_verified: false,
        };
    }

    fn apply_updated(&mut self, e: &SessionUpdated) {
        if let Some(title) = &e.title {
            self.title = title.clone();
        }
        if let Some(description) = &e.description {
            self.description = description.clone();
        }
        if let Some(feedback) = &e.tutor_feedback {
            self.tutor_feedback = feedback.clone();
        }
        if let Some(start) = e.start {
            self.start = start;
        }
        if let Some(end) = e.end {
            self.end = end;
        }
        if let Some(is_online) = e.is_online {
            self.is_online = is_online;
        }
        if let Some(address) = &e.address {
            self.address = address.clone();
        }
        if let Some(ward_id) = &e.ward_id {
            self.ward_id = ward_id.clone();
        }
        if let Some(location) = e.location {
            self.location = location;
        }
        if let Some(materials) = &e.materials {
            self.materials = materials.clone();
        }
        if let Some(is_cancelled) = e.is_cancelled {
            self.is_cancelled = is_cancelled;
        }
        if let Some(is_deleted) = e.is_deleted {
            self.is_deleted = is_deleted;
        }
        if let Some(updated_at) = e.updated_at {
            self.updated_at = updated_at;
        }
        if let Some(feedback_updated_at) = e.feedback_updated_at {
            self.feedback_updated_at = feedback_updated_at;
        }
    }

    fn apply_verification(&mut self, e: &VerificationUpdated) {
        if let Some(status) = e.create_status {
            self.verification.create_status = status;
        }
        if let Some(status) = e.update_status {
            self.verification.update_status = status;
        }
        if let Some(verified) = e.tutor_verified {
            self.verification.tutor_verified = verified;
        }
        if let Some(verified) = e.class_verified {
            self.verification.class_verified = verified;
        }
    }

    fn apply_address(&mut self, e: &AddressResolved) {
        self.is_online = e.is_online;
        self.address = e.address.clone();
        self.ward_id = e.ward_id.clone();
        self.location = e.location;
    }
}
