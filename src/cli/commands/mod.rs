//! CLI command implementations
//!
//! Commands return the process exit code: 0 on success, 2 for configuration
//! errors and 5 for any other failure.

pub mod run;
pub mod validate;

/// Exit code of a run rejected because of its configuration
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit code of a run that failed for any other reason
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed run
pub fn exit_code_for(error: &crate::domain::CruncherError) -> i32 {
    if error.is_configuration() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FATAL
    }
}
