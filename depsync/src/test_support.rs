//! Test-only helpers: a scripted command runner and fixture builders.

use std::cell::RefCell;

use anyhow::{Result, anyhow};
use serde_json::{Map, Value, json};

use crate::core::types::DesiredSet;
use crate::io::process::CommandOutput;
use crate::io::shell::CommandRunner;

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    SpawnError,
}

/// Command runner that records every command line and answers from a script.
///
/// Replies are matched by command-line prefix in insertion order; unmatched
/// commands succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    script: Vec<(String, Reply)>,
    commands: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Succeed with `stdout` for commands starting with `prefix`.
    pub fn ok_with_stdout(self, prefix: &str, stdout: &str) -> Self {
        self.reply(
            prefix,
            Reply::Output(CommandOutput {
                success: true,
                exit_code: Some(0),
                stdout: stdout.as_bytes().to_vec(),
                ..CommandOutput::default()
            }),
        )
    }

    /// Exit 1 but still print `stdout` for commands starting with `prefix`.
    pub fn fail_with_stdout(self, prefix: &str, stdout: &str) -> Self {
        self.reply(
            prefix,
            Reply::Output(CommandOutput {
                success: false,
                exit_code: Some(1),
                stdout: stdout.as_bytes().to_vec(),
                ..CommandOutput::default()
            }),
        )
    }

    /// Exit 1 with `stderr` for commands starting with `prefix`.
    pub fn fail(self, prefix: &str, stderr: &str) -> Self {
        self.reply(
            prefix,
            Reply::Output(CommandOutput {
                success: false,
                exit_code: Some(1),
                stderr: stderr.as_bytes().to_vec(),
                ..CommandOutput::default()
            }),
        )
    }

    /// Fail to launch commands starting with `prefix`.
    pub fn spawn_error(self, prefix: &str) -> Self {
        self.reply(prefix, Reply::SpawnError)
    }

    fn reply(mut self, prefix: &str, reply: Reply) -> Self {
        self.script.push((prefix.to_string(), reply));
        self
    }

    /// Command lines run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    /// Command lines run so far that start with `prefix`.
    pub fn commands_starting_with(&self, prefix: &str) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .cloned()
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command_line: &str) -> Result<CommandOutput> {
        self.commands.borrow_mut().push(command_line.to_string());
        let reply = self
            .script
            .iter()
            .find(|(prefix, _)| command_line.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone());
        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::SpawnError) => Err(anyhow!("spawn command: No such file or directory")),
            None => Ok(CommandOutput {
                success: true,
                exit_code: Some(0),
                ..CommandOutput::default()
            }),
        }
    }
}

/// Build a desired set from name/version pairs.
pub fn desired(pairs: &[(&str, &str)]) -> DesiredSet {
    pairs
        .iter()
        .map(|(name, version)| (name.to_string(), version.to_string()))
        .collect()
}

/// Render an `npm ls --json --depth=0` document.
///
/// A `None` version produces an unresolved (`missing`) entry.
pub fn npm_listing(packages: &[(&str, Option<&str>)]) -> String {
    let mut deps = Map::new();
    for (name, version) in packages {
        let entry = match version {
            Some(version) => json!({ "version": version }),
            None => json!({ "required": "*", "missing": true }),
        };
        deps.insert(name.to_string(), entry);
    }
    let doc = json!({
        "name": "fixture",
        "version": "1.0.0",
        "dependencies": Value::Object(deps),
    });
    doc.to_string()
}
