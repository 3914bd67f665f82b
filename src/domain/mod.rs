//! Domain layer - pure business types and rules, free of I/O.

pub mod class;
pub mod class_session;
pub mod foundation;
pub mod scheduling;
