//! Class ownership records.
//!
//! Classes belong to the class service. This service keeps only who the
//! student and the tutor of record are, to scope queries and authorize
//! session changes.

mod events;
mod record;

pub use events::{
    event_types, ApplicationStatus, ClassApplicationUpdated, ClassCreated, ClassDeleted,
};
pub use record::{ClassRecord, Requester, Role};
