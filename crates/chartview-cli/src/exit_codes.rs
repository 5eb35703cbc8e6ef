//! Exit codes for CLI operations
//!
//! Following sysexits.h where a matching code exists.

/// General error
pub const ERROR: i32 = 1;

/// Cache store could not be opened, read or written
pub const STORE_ERROR: i32 = 2;

/// Repository index or chart archive could not be fetched
pub const UPSTREAM_ERROR: i32 = 3;

/// Requested repository or rendered manifest does not exist
pub const NOT_FOUND: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Invalid configuration or seed file (sysexits EX_CONFIG)
pub const CONFIG_ERROR: i32 = 78;
