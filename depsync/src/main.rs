//! Exact dependency-version enforcer.
//!
//! Meant to run from a project's `preinstall` hook: lists direct dependencies,
//! then reinstalls every configured package whose version is not the pinned
//! one. An optional comma-separated argument exempts packages by name.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use depsync::exit_codes;
use depsync::io::config::{DEFAULT_CONFIG_PATH, load_config};
use depsync::io::package_manager::PackageManager;
use depsync::io::shell::ShellRunner;
use depsync::logging;
use depsync::reconcile::{ReconcileOptions, reconcile};
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "depsync",
    version,
    about = "Enforce exact dependency versions through the package manager"
)]
struct Cli {
    /// Comma-separated package names to leave untouched (e.g. `mobx,d3`).
    ignore: Option<String>,

    /// Path to the version configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Project directory to run package-manager commands in.
    #[arg(short = 'C', long)]
    dir: Option<PathBuf>,

    /// Print the plan without installing or removing anything.
    #[arg(long)]
    dry_run: bool,

    /// Exit non-zero when any package could not be brought to its version.
    #[arg(long)]
    strict: bool,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let cfg = load_config(&cli.config)?;
    debug!(config = %cli.config.display(), packages = cfg.packages.len(), "config loaded");

    let runner = ShellRunner {
        workdir: cli.dir.clone(),
        timeout: cfg.command_timeout(),
        output_limit_bytes: cfg.output_limit_bytes,
    };
    let package_manager = PackageManager::new(cfg.package_manager.clone());
    let report = reconcile(
        &runner,
        &package_manager,
        &cfg.packages,
        cli.ignore.as_deref(),
        ReconcileOptions {
            dry_run: cli.dry_run,
        },
    )?;

    for (name, outcome) in &report.outcomes {
        println!("depsync: {} {}", name, outcome);
    }
    println!("depsync: {}", report.summary_line());

    if cli.strict && report.has_failures() {
        return Ok(exit_codes::PARTIAL);
    }
    Ok(exit_codes::OK)
}
