//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - configuration failed schema validation
pub const VALIDATION_ERROR: i32 = 2;

/// API error - the Kubernetes API server rejected a request
pub const API_ERROR: i32 = 3;

/// Not found - the requested object does not exist
pub const NOT_FOUND: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;

/// Configuration error - provider configuration unusable (sysexits.h EX_CONFIG)
pub const CONFIG_ERROR: i32 = 78;
