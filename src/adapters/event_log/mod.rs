//! Event log adapters.

mod in_memory;

pub use in_memory::InMemoryEventLog;
