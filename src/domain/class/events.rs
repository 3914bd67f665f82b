//! Class service events consumed to keep class records current.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClassId, UserId};

pub mod event_types {
    pub const CLASS_CREATED: &str = "class.created";
    pub const CLASS_DELETED: &str = "class.deleted";
    pub const CLASS_APPLICATION_UPDATED: &str = "class_application.updated";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCreated {
    pub class_id: ClassId,
    pub student_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDeleted {
    pub class_id: ClassId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A tutor applied to a class; approval makes them its tutor of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassApplicationUpdated {
    pub class_id: ClassId,
    pub tutor_id: UserId,
    pub status: ApplicationStatus,
}
