//! StudentHub API Library
//!
//! HTTP handlers for the file and text tools, the artifact session endpoints
//! and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod services;
pub mod setup;
mod utils;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use api_doc::get_openapi_spec;
pub use error::{ErrorResponse, HttpAppError};
pub use services::ToolJobRunner;
