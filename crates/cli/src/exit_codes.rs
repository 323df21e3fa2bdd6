//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | CLI usage error (bad args, unreadable input file)  |
//! | 3    | Storage unavailable or failed                      |
//! | 4    | Validation error (bad name, empty content, ...)    |
//! | 5    | Evaluation not found or not owned by the caller    |
//! | 6    | Partial import (some rows were skipped or failed)  |

use evalgrid_core::EvalError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing or rejected input file.
pub const EXIT_USAGE: u8 = 2;

/// Database could not be opened or a query failed.
pub const EXIT_STORAGE: u8 = 3;

/// Input rejected by a service rule.
pub const EXIT_VALIDATION: u8 = 4;

/// Evaluation absent or owned by someone else. The two are not distinguished.
pub const EXIT_NOT_FOUND: u8 = 5;

/// Import finished but `error_count > 0`.
pub const EXIT_PARTIAL_IMPORT: u8 = 6;

/// Map a service error to its exit code.
pub fn eval_exit_code(err: &EvalError) -> u8 {
    match err {
        EvalError::Validation(_) => EXIT_VALIDATION,
        EvalError::NotFoundOrForbidden => EXIT_NOT_FOUND,
        EvalError::Storage(_) => EXIT_STORAGE,
    }
}
