//! Ports - interfaces between the application and its collaborators.
//!
//! # Write side
//!
//! - `EventLog` - append-only class session streams (source of truth)
//! - `EventPublisher` - outbound integration events
//! - `FileStorage` - session materials
//!
//! # Read side
//!
//! - `ClassSessionReader` / `ClassSessionProjection` - denormalized sessions
//! - `ClassReader` / `ClassDirectory` - class ownership records
//!
//! # Inbound
//!
//! - `EventSubscriber` / `EventHandler` - verification results, address
//!   answers and class changes

mod class_reader;
mod class_session_reader;
mod event_log;
mod event_publisher;
mod event_subscriber;
mod file_storage;

pub use class_reader::{ClassDirectory, ClassListQuery, ClassOverview, ClassPage, ClassReader};
pub use class_session_reader::{
    ClassSessionPage, ClassSessionProjection, ClassSessionReader, ClassSessionView, ListQuery,
    ScheduledSession, SessionStats, SessionStatus, SortDirection, SortField,
};
pub use event_log::EventLog;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventHandler, EventSubscriber};
pub use file_storage::{FileStorage, FileUpload, StoredFile};
