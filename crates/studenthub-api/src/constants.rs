//! API constants

/// API base path prefix (version-independent)
pub const API_BASE: &str = "/api";

/// Current API version
pub const API_VERSION: &str = "v0";

/// Versioned prefix for every tool and session route
pub const API_PREFIX: &str = "/api/v0";
