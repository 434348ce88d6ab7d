//! FocusFlow Shared Library
//!
//! Request/response types and input validation shared between the backend
//! and API clients. Everything that crosses the HTTP boundary is a typed
//! struct defined here, so body shape is checked before business logic runs.

pub mod types;
pub mod validation;

// Re-export commonly used items
pub use types::*;
