//! Class session reader port (read side / CQRS queries).
//!
//! The read projection is a disposable cache rebuilt from the event log.
//! Queries, listings and the overlap check read it; writes never trust it
//! for anything else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::class::Requester;
use crate::domain::class_session::{ClassSession, CreateStatus, GeoPoint, Material, UpdateStatus};
use crate::domain::foundation::{ClassId, ClassSessionId, DomainError, Timestamp, UserId};
use crate::domain::scheduling::Interval;

/// Reader port for class session queries.
#[async_trait]
pub trait ClassSessionReader: Send + Sync {
    /// Returns `None` if the session is unknown or deleted.
    async fn get_by_id(&self, id: ClassSessionId) -> Result<Option<ClassSessionView>, DomainError>;

    /// Lists sessions visible to `requester` whose creation completed.
    async fn list(
        &self,
        query: &ListQuery,
        requester: &Requester,
    ) -> Result<ClassSessionPage, DomainError>;

    /// Sessions of a class that occupy their time slot.
    ///
    /// Cancelled sessions and failed creations are left out.
    async fn schedule_for_class(
        &self,
        class_id: &ClassId,
    ) -> Result<Vec<ScheduledSession>, DomainError>;

    /// Session counts of one class as seen by `requester`.
    ///
    /// Zero counts if the class is unknown or not visible to the requester.
    async fn stats_for_class(
        &self,
        class_id: &ClassId,
        requester: &Requester,
    ) -> Result<SessionStats, DomainError>;
}

/// Writer side of the projection, driven by event synchronization.
#[async_trait]
pub trait ClassSessionProjection: Send + Sync {
    async fn upsert(&self, view: ClassSessionView) -> Result<(), DomainError>;

    async fn remove(&self, id: ClassSessionId) -> Result<(), DomainError>;
}

/// Schedule-relevant status derived at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Cancelled,
    Concluded,
    Scheduled,
}

/// Denormalized session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSessionView {
    pub id: ClassSessionId,
    pub tutor_id: UserId,
    pub class_id: ClassId,
    pub title: String,
    pub description: String,
    pub tutor_feedback: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub is_online: bool,
    pub address: String,
    pub ward_id: String,
    pub location: Option<GeoPoint>,
    pub materials: Vec<Material>,
    pub is_cancelled: bool,
    pub create_status: CreateStatus,
    pub update_status: UpdateStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub feedback_updated_at: Option<Timestamp>,
}

impl ClassSessionView {
    pub fn from_session(session: &ClassSession) -> Self {
        Self {
            id: session.id(),
            tutor_id: session.tutor_id().clone(),
            class_id: session.class_id().clone(),
            title: session.title().to_string(),
            description: session.description().to_string(),
            tutor_feedback: session.tutor_feedback().to_string(),
            start: session.start(),
            end: session.end(),
            is_online: session.is_online(),
            address: session.address().to_string(),
            ward_id: session.ward_id().to_string(),
            location: session.location(),
            materials: session.materials().to_vec(),
            is_cancelled: session.is_cancelled(),
            create_status: session.create_status(),
            update_status: session.update_status(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
            feedback_updated_at: session.feedback_updated_at(),
        }
    }

    /// Cancelled wins over concluded; a session concludes once it ends.
    pub fn status_at(&self, now: Timestamp) -> SessionStatus {
        if self.is_cancelled {
            SessionStatus::Cancelled
        } else if self.end.is_before(&now) {
            SessionStatus::Concluded
        } else {
            SessionStatus::Scheduled
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    /// True if the session holds its slot against new sessions.
    pub fn occupies_slot(&self) -> bool {
        !self.is_cancelled && self.create_status != CreateStatus::Failed
    }
}

/// Session counts of one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub non_cancelled_count: u64,
    /// Not cancelled and not yet ended.
    pub scheduled_count: u64,
    pub total_count: u64,
}

impl SessionStats {
    /// Counts `view` into the totals.
    pub fn record(&mut self, view: &ClassSessionView, now: Timestamp) {
        self.total_count += 1;
        match view.status_at(now) {
            SessionStatus::Cancelled => {}
            SessionStatus::Concluded => self.non_cancelled_count += 1,
            SessionStatus::Scheduled => {
                self.non_cancelled_count += 1;
                self.scheduled_count += 1;
            }
        }
    }
}

/// A session's slot, for overlap checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledSession {
    pub id: ClassSessionId,
    pub interval: Interval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Start,
    End,
    CreatedAt,
    UpdatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Filters, ordering and pagination for listing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive match on title or description.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub class_id: Option<ClassId>,
    /// Empty means any status.
    #[serde(default)]
    pub statuses: Vec<SessionStatus>,
    /// Sessions starting at or after this instant.
    #[serde(default)]
    pub start_from: Option<Timestamp>,
    /// Sessions ending at or before this instant.
    #[serde(default)]
    pub end_until: Option<Timestamp>,
    #[serde(default)]
    pub order_by: SortField,
    #[serde(default)]
    pub direction: SortDirection,
    /// 1-based.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

pub(crate) fn default_page() -> u32 {
    1
}

pub(crate) fn default_limit() -> u32 {
    10
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            q: None,
            class_id: None,
            statuses: Vec::new(),
            start_from: None,
            end_until: None,
            order_by: SortField::default(),
            direction: SortDirection::default(),
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl ListQuery {
    /// Number of records to skip.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSessionPage {
    pub total_count: u64,
    pub results: Vec<ClassSessionView>,
}
