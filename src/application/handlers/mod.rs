//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, and the
//! inbound event handlers that feed them.

pub mod class;
pub mod class_session;
pub mod projection;

pub use class_session::{
    // Commands
    ApplyDefaultAddressHandler, ApplyVerificationResultCommand, ApplyVerificationResultHandler,
    BatchFailure, CreateClassSessionsCommand, CreateClassSessionsHandler, CreateClassSessionsResult,
    DeleteClassSessionCommand, DeleteClassSessionHandler, DeleteMaterialCommand,
    DeleteMaterialHandler, UpdateClassSessionCommand, UpdateClassSessionHandler,
    VerificationOutcome,
    // Queries
    GetClassSessionHandler, GetClassSessionQuery, GetSessionStatsHandler, GetSessionStatsQuery,
    ListClassSessionsHandler, ListClassSessionsQuery,
    // Inbound events
    DefaultAddressListener, VerificationResultListener,
};
pub use class::{GetClassHandler, GetClassQuery, ListClassesHandler, ListClassesQuery};
pub use projection::{ClassDirectorySync, ReadProjectionSync};
