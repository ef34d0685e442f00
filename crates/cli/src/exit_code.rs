//! Process exit status of the aws-s3 CLI
//!
//! Usage errors share status 1 with general failures, matching what scripts
//! already expect from this tool.

use s3cli_core::Error;

/// Exit status of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Usage error or any failure without a more specific status
    GeneralError = 1,

    /// Network failure or timeout
    NetworkError = 3,

    /// Credentials rejected or permission denied
    AuthError = 4,

    /// Bucket or object does not exist
    NotFound = 5,

    /// Cancelled with Ctrl-C
    Interrupted = 130,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Status for a command that failed with `error`
    pub const fn from_error(error: &Error) -> Self {
        match error.exit_code() {
            3 => Self::NetworkError,
            4 => Self::AuthError,
            5 => Self::NotFound,
            _ => Self::GeneralError,
        }
    }
}
