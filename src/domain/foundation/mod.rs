//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and event plumbing
//! that form the vocabulary of the class session domain.

mod command;
mod errors;
mod events;
mod ids;
mod timestamp;

pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{EventEnvelope, EventId, EventMetadata, IntegrationEvent};
pub use ids::{ClassId, ClassSessionId, FileId, UserId};
pub use timestamp::Timestamp;
