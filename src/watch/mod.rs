// Watcher system for detecting field changes around persistence checkpoints

pub mod bindings;
pub mod error;
pub mod registry;
pub mod watcher;

// Re-export core types
pub use bindings::*;
pub use error::*;
pub use registry::*;
pub use watcher::*;
