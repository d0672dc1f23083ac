//! Error types for esxcli operations.
//!
//! Errors are categorized so the CLI can give the user a hint about what
//! went wrong. None of them are retried; every error aborts the run.

use thiserror::Error;

/// Categories of esxcli errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The esxcli binary could not be found or started
    NotInstalled,
    /// The host refused the operation for lack of privileges
    Permission,
    /// The host rejected the operation (bad argument, missing object, ...)
    Rejected,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotInstalled => "esxcli not available",
            Self::Permission => "Permission denied",
            Self::Rejected => "Operation rejected by host",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotInstalled => "Run on an ESXi host or point --esxcli at the binary",
            Self::Permission => "Run as root on the ESXi host",
            Self::Rejected => {
                "The host may be partially configured; fix the input and re-run apply"
            }
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while running esxcli.
#[derive(Debug, Error)]
pub enum Error {
    /// No command was given to the runner
    #[error("empty command line")]
    EmptyCommand,

    /// The process could not be spawned
    #[error("failed to execute {command}: {source}")]
    Spawn {
        /// Command line that was being run
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited non-zero
    #[error("command failed (exit {code}): {command}: {stderr}")]
    CommandFailed {
        /// Command line that failed
        command: String,
        /// Exit code, -1 if killed by a signal
        code: i32,
        /// Standard error output from the failed command
        stderr: String,
    },
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCategory::NotInstalled
            }
            Error::Spawn { source, .. }
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                ErrorCategory::Permission
            }
            Error::CommandFailed { stderr, .. } => {
                let stderr = stderr.to_lowercase();
                if stderr.contains("permission denied") || stderr.contains("not permitted") {
                    ErrorCategory::Permission
                } else {
                    ErrorCategory::Rejected
                }
            }
            _ => ErrorCategory::Other,
        }
    }
}

/// Result type for esxcli operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_not_found_category() {
        let err = Error::Spawn {
            command: "esxcli network nic list".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.category(), ErrorCategory::NotInstalled);
    }

    #[test]
    fn test_command_failed_permission() {
        let err = Error::CommandFailed {
            command: "esxcli network vswitch standard add --vswitch-name=vSwitch0".into(),
            code: 1,
            stderr: "Operation not permitted".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Permission);
    }

    #[test]
    fn test_command_failed_rejected() {
        let err = Error::CommandFailed {
            command: "esxcli network ip interface remove --interface-name=vmk9".into(),
            code: 1,
            stderr: "Unable to find vmknic for dvsName".into(),
        };
        assert_eq!(err.category(), ErrorCategory::Rejected);
        assert!(err.to_string().contains("exit 1"));
    }
}
