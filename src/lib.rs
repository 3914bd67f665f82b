//! Class Sessions - event-sourced scheduling of tutoring sessions
//!
//! Tutors create single or recurring sessions for a class. Every change is
//! checked asynchronously by the user and class services before it takes
//! effect; the session reconciles their answers, reverting rejected updates.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
