//! # Exit Codes
//!
//! Process exit codes for the `hakim` binary. Scripts can tell a bad
//! question from a bad setup without parsing stderr.

use hakim_rag::ErrorClass;

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General error (corpus unreadable, unexpected failure)
pub const EXIT_ERROR: i32 = 1;

/// Configuration error (missing credentials, invalid settings)
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// A backend refused the call because of rate limits or quota
pub const EXIT_RATE_LIMITED: i32 = 3;

/// Invalid input (empty question, lookup without criteria)
pub const EXIT_INVALID_INPUT: i32 = 4;

/// Translate an error class into an exit code.
pub fn for_class(class: ErrorClass) -> i32 {
    match class {
        ErrorClass::Configuration => EXIT_CONFIG_ERROR,
        ErrorClass::RateLimited => EXIT_RATE_LIMITED,
        ErrorClass::InvalidInput => EXIT_INVALID_INPUT,
        ErrorClass::Internal => EXIT_ERROR,
    }
}
