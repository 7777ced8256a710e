// Persistent storage for object permission records
pub mod core;

pub use core::DbOperations;
