//! API models for requests and responses

pub mod api;
pub mod publish;

// Re-export commonly used types
pub use api::*;
pub use publish::*;
