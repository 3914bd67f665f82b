//! Class session domain module.
//!
//! A class session is one scheduled meeting of a class. Its state is a fold
//! over its own event history, and creation and every content update must
//! be confirmed by two asynchronous verifiers (tutor and class) before they
//! are considered final.

mod address;
mod aggregate;
mod errors;
mod events;
mod integration;
mod material;
mod replay;
mod status;

pub use address::validate_address;
pub use aggregate::{ClassSession, NewClassSession};
pub use errors::ClassSessionError;
pub use events::{
    AddressResolved, ClassSessionEvent, SessionCreated, SessionUpdated, VerificationUpdated,
};
pub use integration::{
    event_types, BatchInfo, ClassSessionAddressResolved, ClassSessionCreated,
    ClassSessionDeleted, ClassSessionUpdated, ClassSessionVerificationUpdated,
    DefaultAddressQueried, DefaultAddressReturned, VerificationResult,
};
pub use material::{orphaned_files, GeoPoint, Material};
pub use replay::{
    materials_before_last_update, revert_last_update, state_before_last, state_before_last_update,
    Revert,
};
pub use status::{CreateStatus, UpdateStatus, VerificationState, Verifier};
