//! Unified exit codes for the promotion gate CLI.
//! These codes are part of the public contract; CI pipelines branch on them.

pub const SUCCESS: i32 = 0;
pub const BLOCKED: i32 = 1; // Validation ran and the bundle is not acceptable
pub const CONFIG_ERROR: i32 = 2; // Bad invocation, missing root, or I/O failure
