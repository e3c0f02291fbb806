//! Data models for the application
//!
//! Session records and their HTTP representations, per-tool request
//! parameters, and the text utility results.

mod session;
mod text;
mod tools;

// Re-export all models for convenient imports
pub use session::*;
pub use text::*;
pub use tools::*;
