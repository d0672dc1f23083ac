//! Process execution for esxcli.
//!
//! [`Runner`] is the seam between the typed client and the operating system.
//! [`ProcessRunner`] spawns real processes; tests use
//! [`MockRunner`](crate::mock::MockRunner).

use crate::error::{Error, Result};
use std::process::{Command, Output};

/// Output captured from a finished command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, -1 if the process was killed by a signal
    pub code: i32,
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Raw standard error
    pub stderr: Vec<u8>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

impl CommandOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Runs a command line and reports how it went.
///
/// `argv[0]` is the program. A non-zero exit is *not* an error at this
/// level; only failing to run the process at all is.
pub trait Runner {
    /// Run `argv` to completion and capture its output.
    fn run(&self, argv: &[String]) -> Result<CommandOutput>;
}

/// Runner that spawns real processes and blocks until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        let (program, args) = argv.split_first().ok_or(Error::EmptyCommand)?;
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| Error::Spawn {
                command: argv.join(" "),
                source,
            })?;
        Ok(output.into())
    }
}
