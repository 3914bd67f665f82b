//! Materials attached to a session and the session location.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::FileId;

/// A file attached to a class session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material {
    pub id: FileId,
    #[serde(default)]
    pub description: String,
}

impl Material {
    pub fn new(id: FileId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

/// Geographic point of an in-person session (longitude, latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

/// Files referenced in `before` but no longer in `after`.
pub fn orphaned_files(before: &[Material], after: &[Material]) -> Vec<FileId> {
    before
        .iter()
        .filter(|old| !after.iter().any(|kept| kept.id == old.id))
        .map(|old| old.id.clone())
        .collect()
}
