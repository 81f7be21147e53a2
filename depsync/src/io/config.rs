//! Enforcement configuration stored in `depsync.toml`.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::core::types::DesiredSet;
use crate::io::process::DEFAULT_OUTPUT_LIMIT_BYTES;

/// Default config file name, resolved against the current directory.
pub const DEFAULT_CONFIG_PATH: &str = "depsync.toml";

/// Enforcement configuration (TOML).
///
/// Edited by hand before each use. Everything except `packages` has a default
/// suited to npm.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Cap on captured stdout/stderr per package-manager command.
    pub output_limit_bytes: usize,

    /// Kill a package-manager command after this many seconds. Unset waits forever.
    pub command_timeout_secs: Option<u64>,

    /// Package name to exact required version.
    pub packages: DesiredSet,

    pub package_manager: PackageManagerConfig,
}

/// Command-line templates for the package manager.
///
/// `{name}` and `{version}` are substituted verbatim.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PackageManagerConfig {
    /// Lists direct dependencies as JSON.
    pub list: String,
    /// Installs `{name}` pinned to exactly `{version}`.
    pub install: String,
    /// Removes `{name}`.
    pub remove: String,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            list: "npm ls --json --depth=0".to_string(),
            install: "npm install --save-exact {name}@{version}".to_string(),
            remove: "npm remove {name}".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_limit_bytes: DEFAULT_OUTPUT_LIMIT_BYTES,
            command_timeout_secs: None,
            packages: DesiredSet::new(),
            package_manager: PackageManagerConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.command_timeout_secs == Some(0) {
            return Err(anyhow!("command_timeout_secs must be > 0 when set"));
        }
        self.package_manager.validate()?;
        for (name, version) in &self.packages {
            if name.trim().is_empty() {
                return Err(anyhow!("packages: package name must be non-empty"));
            }
            if version.trim().is_empty() {
                return Err(anyhow!("packages.{name}: version must be non-empty"));
            }
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }
}

impl PackageManagerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.list.trim().is_empty() {
            return Err(anyhow!("package_manager.list must be non-empty"));
        }
        if !self.install.contains("{name}") || !self.install.contains("{version}") {
            return Err(anyhow!(
                "package_manager.install must contain {{name}} and {{version}}"
            ));
        }
        if !self.remove.contains("{name}") {
            return Err(anyhow!("package_manager.remove must contain {{name}}"));
        }
        Ok(())
    }
}

/// Load and validate config from a TOML file.
///
/// Unlike optional tool settings, the file is required: without it there is no
/// desired version to enforce.
pub fn load_config(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
