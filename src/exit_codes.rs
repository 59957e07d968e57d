//! Exit code constants for the subtab CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files, invalid tab state)
//! - 2: Configuration error (missing keys, state selection, unknown tab type)
//! - 3: Tab failure (only with `run --strict`)
//! - 4: Internal error (unexpected runner fault)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unreadable or unwritable files.
pub const USER_ERROR: i32 = 1;

/// Configuration error: rejected at load time, before any process is spawned.
pub const CONFIG_ERROR: i32 = 2;

/// At least one tab's command failed and `--strict` was given.
pub const TAB_FAILURE: i32 = 3;

/// Unexpected fault while supervising a child process.
pub const INTERNAL_ERROR: i32 = 4;
