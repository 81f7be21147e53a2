//! Orchestration for one reconciliation run.
//!
//! Fetches the dependency snapshot, diffs it against the desired versions, and
//! applies corrective commands one package at a time. Only an unusable
//! snapshot aborts the run; a failing package is recorded and skipped.

use anyhow::{Context, Result, bail};
use tracing::{error, info, instrument};

use crate::core::ignore::parse_ignore_arg;
use crate::core::plan::build_plan;
use crate::core::types::{Action, ActionOutcome, DesiredSet, PlannedAction, ReconcileReport};
use crate::io::package_manager::PackageManager;
use crate::io::process::CommandOutput;
use crate::io::shell::CommandRunner;

/// Knobs for a reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Compute and report the plan without running install/remove commands.
    pub dry_run: bool,
}

/// Bring every in-scope package to its desired exact version.
///
/// `ignore_arg` is the raw comma-separated exemption list. Returns one outcome
/// per desired package that the snapshot lists and that is not ignored,
/// ordered by package name.
#[instrument(skip_all, fields(desired = desired.len(), dry_run = options.dry_run))]
pub fn reconcile<R: CommandRunner>(
    runner: &R,
    package_manager: &PackageManager,
    desired: &DesiredSet,
    ignore_arg: Option<&str>,
    options: ReconcileOptions,
) -> Result<ReconcileReport> {
    let snapshot = package_manager
        .fetch_snapshot(runner)
        .context("fetch dependency snapshot")?;
    let ignored = parse_ignore_arg(ignore_arg);
    let plan = build_plan(desired, &snapshot, &ignored);
    info!(
        installed = snapshot.len(),
        ignored = ignored.len(),
        actions = plan.actions.len(),
        unchanged = plan.unchanged.len(),
        "plan built"
    );

    let mut report = ReconcileReport::default();
    for name in &plan.unchanged {
        report.record(name, ActionOutcome::Unchanged);
    }

    for planned in &plan.actions {
        let outcome = if options.dry_run {
            ActionOutcome::Planned(planned.action)
        } else {
            apply_action(runner, package_manager, planned)
        };
        if let ActionOutcome::Failed { reason } = &outcome {
            error!(package = %planned.name, %reason, "failed to enforce version");
        }
        report.record(&planned.name, outcome);
    }

    report.outcomes.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(report)
}

/// Run the corrective commands for one package, converting failures into an outcome.
fn apply_action<R: CommandRunner>(
    runner: &R,
    package_manager: &PackageManager,
    planned: &PlannedAction,
) -> ActionOutcome {
    let name = planned.name.as_str();
    let version = planned.desired_version.as_str();
    info!(
        package = name,
        installed = planned.installed_version.as_deref().unwrap_or("<none>"),
        desired = version,
        action = ?planned.action,
        "enforcing version"
    );

    let result = match planned.action {
        Action::Install => {
            ensure_success(package_manager.install(runner, name, version), "install")
                .map(|()| ActionOutcome::Installed)
        }
        Action::Reinstall => ensure_success(package_manager.remove(runner, name), "remove")
            .and_then(|()| {
                ensure_success(package_manager.install(runner, name, version), "install")
            })
            .map(|()| ActionOutcome::Reinstalled),
    };

    result.unwrap_or_else(|err| ActionOutcome::Failed {
        reason: format!("{err:#}"),
    })
}

fn ensure_success(result: Result<CommandOutput>, step: &str) -> Result<()> {
    let output = result.with_context(|| format!("{step} command"))?;
    if !output.success {
        bail!("{step} command failed: {}", output.failure_reason());
    }
    Ok(())
}
