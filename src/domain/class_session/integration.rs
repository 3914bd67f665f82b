//! Integration events exchanged with other services.
//!
//! Published after a commit:
//! - `ClassSessionCreated` - Starts creation verification
//! - `ClassSessionUpdated` - Starts update verification, refreshes projections
//! - `ClassSessionDeleted` - Session soft-deleted
//! - `ClassSessionVerificationUpdated` - Status axes changed
//! - `ClassSessionAddressResolved` - Default address applied
//! - `DefaultAddressQueried` - Asks the class service for its address
//!
//! Consumed:
//! - `VerificationResult` - Tutor or class check answered
//! - `DefaultAddressReturned` - Class service answered an address query

use serde::{Deserialize, Serialize};

use super::{ClassSession, CreateStatus, GeoPoint, UpdateStatus};
use crate::domain::foundation::{
    ClassId, ClassSessionId, EventId, IntegrationEvent, Timestamp, UserId,
};

/// Routing for a class session event with `event_id` and `class_session_id` fields.
macro_rules! class_session_event {
    ($event:ident, $event_type:expr, $occurred_at:ident) => {
        impl IntegrationEvent for $event {
            const EVENT_TYPE: &'static str = $event_type;

            fn event_id(&self) -> EventId {
                self.event_id
            }

            fn aggregate_id(&self) -> String {
                self.class_session_id.to_string()
            }

            fn occurred_at(&self) -> Timestamp {
                self.$occurred_at
            }
        }
    };
}

/// Outbound event types.
pub mod event_types {
    pub const CREATED: &str = "class_session.created";
    pub const UPDATED: &str = "class_session.updated";
    pub const DELETED: &str = "class_session.deleted";
    pub const VERIFICATION_UPDATED: &str = "class_session.verification_updated";
    pub const ADDRESS_RESOLVED: &str = "class_session.address_resolved";
    pub const DEFAULT_ADDRESS_QUERY: &str = "class_session.default_address_query";

    pub const TUTOR_VERIFIED: &str = "class_session.tutor_verified";
    pub const CLASS_VERIFIED: &str = "class_session.class_verified";
    pub const DEFAULT_ADDRESS_RETURNED: &str = "class_session.default_address_returned";
}

/// Position of a session within one creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInfo {
    pub is_first_session_in_batch: bool,
    pub num_of_sessions_created_in_batch: usize,
}

impl BatchInfo {
    pub fn single() -> Self {
        Self {
            is_first_session_in_batch: true,
            num_of_sessions_created_in_batch: 1,
        }
    }

    pub fn nth(index: usize, total: usize) -> Self {
        Self {
            is_first_session_in_batch: index == 0,
            num_of_sessions_created_in_batch: total,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassSessionCreated
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSessionCreated {
    pub event_id: EventId,
    pub class_session_id: ClassSessionId,
    pub tutor_id: UserId,
    pub class_id: ClassId,
    pub title: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub batch: BatchInfo,
}

class_session_event!(ClassSessionCreated, event_types::CREATED, created_at);

impl ClassSessionCreated {
    pub fn new(session: &ClassSession, batch: BatchInfo) -> Self {
        Self {
            event_id: EventId::new(),
            class_session_id: session.id(),
            tutor_id: session.tutor_id().clone(),
            class_id: session.class_id().clone(),
            title: session.title().to_string(),
            start: session.start(),
            end: session.end(),
            created_at: session.created_at(),
            batch,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassSessionUpdated
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSessionUpdated {
    pub event_id: EventId,
    pub class_session_id: ClassSessionId,
    pub tutor_id: UserId,
    pub class_id: ClassId,
    pub title: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub is_cancelled: bool,
    pub tutor_feedback: String,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_updated_at: Option<Timestamp>,
    pub occurred_at: Timestamp,
}

class_session_event!(ClassSessionUpdated, event_types::UPDATED, occurred_at);

impl ClassSessionUpdated {
    pub fn new(session: &ClassSession) -> Self {
        Self {
            event_id: EventId::new(),
            class_session_id: session.id(),
            tutor_id: session.tutor_id().clone(),
            class_id: session.class_id().clone(),
            title: session.title().to_string(),
            start: session.start(),
            end: session.end(),
            is_cancelled: session.is_cancelled(),
            tutor_feedback: session.tutor_feedback().to_string(),
            updated_at: session.updated_at(),
            feedback_updated_at: session.feedback_updated_at(),
            occurred_at: Timestamp::now(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassSessionDeleted
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSessionDeleted {
    pub event_id: EventId,
    pub class_session_id: ClassSessionId,
    pub class_id: ClassId,
    pub deleted_at: Timestamp,
}

class_session_event!(ClassSessionDeleted, event_types::DELETED, deleted_at);

impl ClassSessionDeleted {
    pub fn new(session: &ClassSession) -> Self {
        Self {
            event_id: EventId::new(),
            class_session_id: session.id(),
            class_id: session.class_id().clone(),
            deleted_at: Timestamp::now(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassSessionVerificationUpdated
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSessionVerificationUpdated {
    pub event_id: EventId,
    pub class_session_id: ClassSessionId,
    pub create_status: CreateStatus,
    pub update_status: UpdateStatus,
    pub tutor_verified: bool,
    pub class_verified: bool,
    pub occurred_at: Timestamp,
}

class_session_event!(ClassSessionVerificationUpdated, event_types::VERIFICATION_UPDATED, occurred_at);

impl ClassSessionVerificationUpdated {
    pub fn new(session: &ClassSession) -> Self {
        Self {
            event_id: EventId::new(),
            class_session_id: session.id(),
            create_status: session.create_status(),
            update_status: session.update_status(),
            tutor_verified: session.tutor_verified(),
            class_verified: session.class_verified(),
            occurred_at: Timestamp::now(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClassSessionAddressResolved
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSessionAddressResolved {
    pub event_id: EventId,
    pub class_session_id: ClassSessionId,
    pub address: String,
    pub ward_id: String,
    pub occurred_at: Timestamp,
}

class_session_event!(ClassSessionAddressResolved, event_types::ADDRESS_RESOLVED, occurred_at);

impl ClassSessionAddressResolved {
    pub fn new(session: &ClassSession) -> Self {
        Self {
            event_id: EventId::new(),
            class_session_id: session.id(),
            address: session.address().to_string(),
            ward_id: session.ward_id().to_string(),
            occurred_at: Timestamp::now(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DefaultAddressQueried
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultAddressQueried {
    pub event_id: EventId,
    pub class_session_id: ClassSessionId,
    pub class_id: ClassId,
    pub requested_at: Timestamp,
}

class_session_event!(DefaultAddressQueried, event_types::DEFAULT_ADDRESS_QUERY, requested_at);

impl DefaultAddressQueried {
    pub fn new(session: &ClassSession) -> Self {
        Self {
            event_id: EventId::new(),
            class_session_id: session.id(),
            class_id: session.class_id().clone(),
            requested_at: Timestamp::now(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Inbound
// ════════════════════════════════════════════════════════════════════════════

/// Answer from the tutor or class verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub class_session_id: ClassSessionId,
    #[serde(alias = "is_valid_tutor", alias = "is_valid_class")]
    pub is_valid: bool,
}

/// Class default address returned for a pending session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultAddressReturned {
    pub class_session_id: ClassSessionId,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ward_id: String,
    pub is_online: bool,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}
