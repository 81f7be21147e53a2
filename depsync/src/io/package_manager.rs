//! Package-manager adapter: renders command lines and runs them.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::snapshot::{parse_snapshot, unresolved_names};
use crate::core::types::InstalledSnapshot;
use crate::io::config::PackageManagerConfig;
use crate::io::process::CommandOutput;
use crate::io::shell::CommandRunner;

/// Package manager driven through command-line templates.
#[derive(Debug, Clone)]
pub struct PackageManager {
    commands: PackageManagerConfig,
}

impl PackageManager {
    pub fn new(commands: PackageManagerConfig) -> Self {
        Self { commands }
    }

    /// `npm` with `--save-exact` installs.
    pub fn npm() -> Self {
        Self::new(PackageManagerConfig::default())
    }

    pub fn list_command(&self) -> String {
        self.commands.list.clone()
    }

    pub fn install_command(&self, name: &str, version: &str) -> String {
        self.commands
            .install
            .replace("{name}", name)
            .replace("{version}", version)
    }

    pub fn remove_command(&self, name: &str) -> String {
        self.commands.remove.replace("{name}", name)
    }

    /// Fetch and parse the direct-dependency listing.
    ///
    /// The listing command commonly exits non-zero while still printing a valid
    /// tree (e.g. when a declared dependency is not installed yet), so the exit
    /// status is only logged. Unparsable output is an error.
    #[instrument(skip_all)]
    pub fn fetch_snapshot<R: CommandRunner>(&self, runner: &R) -> Result<InstalledSnapshot> {
        let command = self.list_command();
        let output = runner
            .run(&command)
            .context("run dependency listing command")?;
        if !output.success {
            warn!(
                exit_code = ?output.exit_code,
                "dependency listing exited unsuccessfully, using its output anyway"
            );
        }
        let snapshot = parse_snapshot(&output.stdout_text())
            .with_context(|| format!("read output of `{command}`"))?;
        let unresolved = unresolved_names(&snapshot);
        if !unresolved.is_empty() {
            info!(
                packages = ?unresolved,
                "dependency listing reports packages that are not installed"
            );
        }
        debug!(packages = snapshot.len(), "dependency snapshot loaded");
        Ok(snapshot)
    }

    pub fn install<R: CommandRunner>(
        &self,
        runner: &R,
        name: &str,
        version: &str,
    ) -> Result<CommandOutput> {
        runner.run(&self.install_command(name, version))
    }

    pub fn remove<R: CommandRunner>(&self, runner: &R, name: &str) -> Result<CommandOutput> {
        runner.run(&self.remove_command(name))
    }
}
