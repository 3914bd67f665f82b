//! EventLog port - append-only class session event streams.
//!
//! The event log is the only source of truth for class session state.
//! Streams are keyed by aggregate id and never rewritten.

use async_trait::async_trait;

use crate::domain::class_session::ClassSessionEvent;
use crate::domain::foundation::{ClassSessionId, DomainError};

/// Append-only store of class session events.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends `events` to the end of the stream, all or nothing.
    ///
    /// Appending to an unknown id starts a new stream.
    async fn append(
        &self,
        id: ClassSessionId,
        events: &[ClassSessionEvent],
    ) -> Result<(), DomainError>;

    /// Reads the full stream in append order.
    ///
    /// # Errors
    ///
    /// `EventStreamNotFound` if nothing was ever appended for `id`.
    async fn read(&self, id: ClassSessionId) -> Result<Vec<ClassSessionEvent>, DomainError>;
}
