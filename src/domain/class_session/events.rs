//! Class session domain events.
//!
//! These are the facts appended to a session's event stream. The aggregate
//! state is a fold over them:
//! - `Created` - Session scheduled
//! - `Updated` - Partial content change (including soft delete)
//! - `VerificationUpdated` - Status axes and verified flags changed
//! - `AddressResolved` - Class default address applied
//!
//! Fields left `None` in a partial event leave the aggregate untouched.

use serde::{Deserialize, Deserializer, Serialize};

use super::{CreateStatus, GeoPoint, Material, UpdateStatus};
use crate::domain::foundation::{ClassId, Timestamp, UserId};

/// One fact in a class session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ClassSessionEvent {
    Created(SessionCreated),
    Updated(SessionUpdated),
    VerificationUpdated(VerificationUpdated),
    AddressResolved(AddressResolved),
}

impl ClassSessionEvent {
    /// Stable name of the event kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassSessionEvent::Created(_) => "created",
            ClassSessionEvent::Updated(_) => "updated",
            ClassSessionEvent::VerificationUpdated(_) => "verification_updated",
            ClassSessionEvent::AddressResolved(_) => "address_resolved",
        }
    }

    /// True for content updates. Verification and address events never match.
    pub fn is_content_update(&self) -> bool {
        matches!(self, ClassSessionEvent::Updated(_))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Created
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCreated {
    pub tutor_id: UserId,
    pub class_id: ClassId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub is_online: bool,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ward_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    pub created_at: Timestamp,
}

// ════════════════════════════════════════════════════════════════════════════
// Updated
// ════════════════════════════════════════════════════════════════════════════

/// Partial content change.
///
/// Double options distinguish "leave as is" (`None`) from "clear"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUpdated {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor_feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub location: Option<Option<GeoPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials: Option<Vec<Material>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_cancelled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub feedback_updated_at: Option<Option<Timestamp>>,
}

impl SessionUpdated {
    /// True if any schedule field is set.
    pub fn touches_time(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    /// True if any address field is set.
    pub fn touches_address(&self) -> bool {
        self.is_online.is_some()
            || self.address.is_some()
            || self.ward_id.is_some()
            || self.location.is_some()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VerificationUpdated
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationUpdated {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_status: Option<CreateStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_status: Option<UpdateStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_verified: Option<bool>,
}

// ════════════════════════════════════════════════════════════════════════════
// AddressResolved
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressResolved {
    pub is_online: bool,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub ward_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

/// Present-but-null deserializes to `Some(None)`, absent to `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
