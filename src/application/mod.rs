//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, writes go through the event log and reads through the
//! projection.

mod class_session_store;
mod event_dispatcher;
pub mod handlers;
mod lock_registry;

pub use class_session_store::ClassSessionStore;
pub use event_dispatcher::ClassSessionEventDispatcher;
pub use handlers::*;
pub use lock_registry::{LockRegistry, SessionLockGuard};
