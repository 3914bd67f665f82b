//! Class query handlers.
//!
//! Classes are owned by the class service; these read the ownership records
//! mirrored into the projection.

mod get_class;
mod list_classes;

pub use get_class::{GetClassHandler, GetClassQuery};
pub use list_classes::{ListClassesHandler, ListClassesQuery};
