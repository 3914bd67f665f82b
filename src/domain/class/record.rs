//! Class record and requester identity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClassId, UserId};

/// Role a requester acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Tutor,
}

/// Authenticated caller of a command or query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: UserId,
    pub role: Role,
}

impl Requester {
    pub fn student(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Student,
        }
    }

    pub fn tutor(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Tutor,
        }
    }
}

/// Ownership of a class as seen by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub class_id: ClassId,
    pub student_id: UserId,
    /// Assigned once a tutor application is approved.
    #[serde(default)]
    pub tutor_id: Option<UserId>,
}

impl ClassRecord {
    pub fn new(class_id: ClassId, student_id: UserId) -> Self {
        Self {
            class_id,
            student_id,
            tutor_id: None,
        }
    }

    pub fn with_tutor(mut self, tutor_id: UserId) -> Self {
        self.tutor_id = Some(tutor_id);
        self
    }

    /// True if `user_id` is the tutor of record.
    pub fn is_tutored_by(&self, user_id: &UserId) -> bool {
        self.tutor_id.as_ref() == Some(user_id)
    }

    /// Students see their own classes, tutors the classes they teach.
    pub fn is_visible_to(&self, requester: &Requester) -> bool {
        match requester.role {
            Role::Student => self.student_id == requester.user_id,
            Role::Tutor => self.is_tutored_by(&requester.user_id),
        }
    }
}
