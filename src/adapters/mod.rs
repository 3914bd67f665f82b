//! Adapters - implementations of the ports.
//!
//! All adapters here are in-process. Durable stores and message transports
//! plug in behind the same ports.

pub mod event_log;
pub mod events;
pub mod files;
pub mod projection;

pub use event_log::InMemoryEventLog;
pub use events::InMemoryEventBus;
pub use files::InMemoryFileStorage;
pub use projection::InMemoryReadProjection;
