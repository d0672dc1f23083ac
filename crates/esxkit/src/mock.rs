//! Test double for [`Runner`].
//!
//! Records every command line it is asked to run and serves canned output
//! for inspection commands, so callers can assert on the exact sequence of
//! esxcli invocations. Clones share state, which lets a test keep a handle
//! after boxing one copy into an [`Esxcli`](crate::Esxcli).

use crate::error::Result;
use crate::runner::{CommandOutput, Runner};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct MockState {
    commands: Vec<String>,
    outputs: HashMap<String, String>,
    failures: Vec<(String, String)>,
}

/// Records commands and returns preset responses.
#[derive(Debug, Default, Clone)]
pub struct MockRunner {
    state: Rc<RefCell<MockState>>,
}

impl MockRunner {
    /// Create a runner with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `stdout` for an exact command (program name excluded),
    /// e.g. `"network nic list"`.
    pub fn respond(&self, command: &str, stdout: &str) -> &Self {
        self.state
            .borrow_mut()
            .outputs
            .insert(command.to_string(), stdout.to_string());
        self
    }

    /// Make every command starting with `prefix` exit 1 with `stderr`.
    pub fn fail(&self, prefix: &str, stderr: &str) -> &Self {
        self.state
            .borrow_mut()
            .failures
            .push((prefix.to_string(), stderr.to_string()));
        self
    }

    /// All commands run so far, program name excluded.
    pub fn commands(&self) -> Vec<String> {
        self.state.borrow().commands.clone()
    }

    /// Commands run so far that start with `prefix`.
    pub fn commands_matching(&self, prefix: &str) -> Vec<String> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|c| c.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Commands that change host state (everything except `list`/`get`).
    pub fn mutations(&self) -> Vec<String> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|c| !is_query(c))
            .cloned()
            .collect()
    }
}

fn is_query(command: &str) -> bool {
    command.ends_with(" list") || command.ends_with(" get")
}

impl Runner for MockRunner {
    fn run(&self, argv: &[String]) -> Result<CommandOutput> {
        let command = argv.get(1..).unwrap_or_default().join(" ");
        let mut state = self.state.borrow_mut();
        state.commands.push(command.clone());

        if let Some((_, stderr)) = state
            .failures
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
        {
            return Ok(CommandOutput {
                code: 1,
                stdout: Vec::new(),
                stderr: stderr.clone().into_bytes(),
            });
        }

        let stdout = state.outputs.get(&command).cloned().unwrap_or_default();
        Ok(CommandOutput {
            code: 0,
            stdout: stdout.into_bytes(),
            stderr: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("esxcli")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_records_and_responds() {
        let mock = MockRunner::new();
        mock.respond("network nic list", "vmnic0 ...");
        let handle = mock.clone();

        let out = mock.run(&argv(&["network", "nic", "list"])).unwrap();
        assert_eq!(out.stdout_str(), "vmnic0 ...");
        assert_eq!(handle.commands(), vec!["network nic list"]);
        assert!(handle.mutations().is_empty());
    }

    #[test]
    fn test_failure_prefix() {
        let mock = MockRunner::new();
        mock.fail("network vswitch standard add", "boom");

        let out = mock
            .run(&argv(&["network", "vswitch", "standard", "add", "--vswitch-name=vSwitch0"]))
            .unwrap();
        assert!(!out.success());
        assert_eq!(out.stderr_str(), "boom");
        assert_eq!(mock.mutations().len(), 1);
    }
}
