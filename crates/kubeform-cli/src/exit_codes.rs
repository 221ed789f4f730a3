//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - the resource configuration does not fit its kind
pub const VALIDATION_ERROR: i32 = 2;

/// Render error - a bound model could not be rendered
pub const RENDER_ERROR: i32 = 3;

/// Unknown kind - no registered kind has the requested resource name
pub const UNKNOWN_KIND: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
