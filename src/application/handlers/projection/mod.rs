//! Read side synchronization handlers.

mod class_directory_sync;
mod read_projection_sync;

pub use class_directory_sync::ClassDirectorySync;
pub use read_projection_sync::ReadProjectionSync;
