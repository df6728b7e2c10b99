//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (rejected title or bone name)
pub const DATAERR: i32 = 65;

/// Cannot open input (unknown bone)
pub const NOINPUT: i32 = 66;

/// Service unavailable (diagram store unreachable or refused)
pub const UNAVAILABLE: i32 = 69;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;

/// Interrupted by Ctrl-C (128 + SIGINT)
pub const CANCELLED: i32 = 130;
