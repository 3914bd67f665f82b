//! Class reader port - ownership records of classes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::class::{ClassRecord, Requester};
use crate::domain::foundation::{ClassId, DomainError, Timestamp, UserId};

use super::class_session_reader::{default_limit, default_page, ClassSessionView, SessionStatus};

/// Lookup of class ownership.
#[async_trait]
pub trait ClassReader: Send + Sync {
    async fn get_class(&self, class_id: &ClassId) -> Result<Option<ClassRecord>, DomainError>;

    /// Classes visible to `requester`, each with its created sessions.
    async fn list_classes(
        &self,
        query: &ClassListQuery,
        requester: &Requester,
    ) -> Result<ClassPage, DomainError>;
}

/// Maintains class ownership records from class service events.
#[async_trait]
pub trait ClassDirectory: Send + Sync {
    async fn insert_class(&self, record: ClassRecord) -> Result<(), DomainError>;

    async fn remove_class(&self, class_id: &ClassId) -> Result<(), DomainError>;

    /// Sets the tutor of record; unknown classes are ignored.
    async fn assign_tutor(&self, class_id: &ClassId, tutor_id: UserId) -> Result<(), DomainError>;
}

/// Filters and pagination for listing classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassListQuery {
    /// SCHEDULED and CONCLUDED select classes; CANCELLED is ignored.
    #[serde(default)]
    pub statuses: Vec<SessionStatus>,
    /// Sessions starting at or after this instant.
    #[serde(default)]
    pub start_from: Option<Timestamp>,
    /// Sessions ending at or before this instant.
    #[serde(default)]
    pub end_until: Option<Timestamp>,
    /// 1-based.
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for ClassListQuery {
    fn default() -> Self {
        Self {
            statuses: Vec::new(),
            start_from: None,
            end_until: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl ClassListQuery {
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.limit as usize
    }

    /// True if a session time window was given.
    pub fn has_window(&self) -> bool {
        self.start_from.is_some() || self.end_until.is_some()
    }

    pub fn in_window(&self, view: &ClassSessionView) -> bool {
        self.start_from.map_or(true, |from| view.start >= from)
            && self.end_until.map_or(true, |until| view.end <= until)
    }

    /// Whether a class passes the status filter, given if it still has
    /// sessions ahead.
    pub fn admits(&self, has_sessions_ahead: bool) -> bool {
        let scheduled = self.statuses.contains(&SessionStatus::Scheduled);
        let concluded = self.statuses.contains(&SessionStatus::Concluded);
        match (scheduled, concluded) {
            (true, false) => has_sessions_ahead,
            (false, true) => !has_sessions_ahead,
            _ => true,
        }
    }
}

/// A class together with its sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOverview {
    #[serde(flatten)]
    pub class: ClassRecord,
    pub sessions: Vec<ClassSessionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPage {
    pub total_count: u64,
    pub results: Vec<ClassOverview>,
}
