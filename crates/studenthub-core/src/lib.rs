//! StudentHub Core Library
//!
//! This crate provides the domain models, error types, configuration and clock
//! abstraction shared by every StudentHub component.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BaseConfig, Config, ToolsConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    ArtifactSession, GrammarIssue, GrammarIssueKind, GrammarReport, ImageOutputFormat, SessionId,
    SessionState, SessionTicket, Summary, TextStats,
};
