//! Shared deterministic types for reconciliation.
//!
//! These types describe desired state, observed state, and the corrective
//! actions that bridge them. They carry no I/O and iterate in a stable order
//! so that plans and reports are reproducible across runs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Deserialize;

/// Package name to exact required version.
pub type DesiredSet = BTreeMap<String, String>;

/// Package names exempt from inspection and modification.
pub type IgnoreSet = BTreeSet<String>;

/// Direct dependencies reported by the package manager, keyed by name.
pub type InstalledSnapshot = BTreeMap<String, InstalledPackage>;

/// One entry of the package manager's dependency listing.
///
/// `version` is `None` when the package is declared in the tree but has not
/// been resolved or installed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstalledPackage {
    #[serde(default)]
    pub version: Option<String>,
    /// npm's flag for a declared dependency absent from `node_modules`.
    #[serde(default)]
    pub missing: bool,
}

/// Corrective action required to bring one package to its desired version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Listed without a resolved version: install at the exact version.
    Install,
    /// Installed at a different version: remove, then install.
    Reinstall,
}

/// A package scheduled for correction, in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub name: String,
    pub desired_version: String,
    /// Version currently reported by the package manager, if any.
    pub installed_version: Option<String>,
    pub action: Action,
}

/// Result of classifying and planning the in-scope packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPlan {
    /// Packages that need a corrective action.
    pub actions: Vec<PlannedAction>,
    /// In-scope packages already at their desired version.
    pub unchanged: Vec<String>,
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Per-package result of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Version already matched; no command issued.
    Unchanged,
    /// Was listed without a version and got installed.
    Installed,
    /// Was at the wrong version and got removed and reinstalled.
    Reinstalled,
    /// A remove or install command failed; the package keeps its prior state.
    Failed { reason: String },
    /// Dry run: the action that would have been taken.
    Planned(Action),
}

impl ActionOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ActionOutcome::Failed { .. })
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Unchanged => write!(f, "unchanged"),
            ActionOutcome::Installed => write!(f, "installed"),
            ActionOutcome::Reinstalled => write!(f, "reinstalled"),
            ActionOutcome::Failed { reason } => write!(f, "failed ({reason})"),
            ActionOutcome::Planned(Action::Install) => write!(f, "would install"),
            ActionOutcome::Planned(Action::Reinstall) => write!(f, "would reinstall"),
        }
    }
}

/// Ordered outcomes of one reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub outcomes: Vec<(String, ActionOutcome)>,
}

impl ReconcileReport {
    pub fn record(&mut self, name: impl Into<String>, outcome: ActionOutcome) {
        self.outcomes.push((name.into(), outcome));
    }

    pub fn outcome_of(&self, name: &str) -> Option<&ActionOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn count(&self, pred: impl Fn(&ActionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn failed(&self) -> usize {
        self.count(ActionOutcome::is_failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// One-line counts summary for console output.
    pub fn summary_line(&self) -> String {
        format!(
            "installed={} reinstalled={} unchanged={} failed={}",
            self.count(|o| matches!(o, ActionOutcome::Installed)),
            self.count(|o| matches!(o, ActionOutcome::Reinstalled)),
            self.count(|o| matches!(o, ActionOutcome::Unchanged)),
            self.failed(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_package_tolerates_missing_version_and_extra_fields() {
        let pkg: InstalledPackage = serde_json::from_str(
            r#"{"required": "^1.0.0", "missing": true, "problems": ["missing: x"]}"#,
        )
        .expect("parse");
        assert_eq!(pkg.version, None);
        assert!(pkg.missing);
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut report = ReconcileReport::default();
        report.record("a", ActionOutcome::Installed);
        report.record("b", ActionOutcome::Reinstalled);
        report.record("c", ActionOutcome::Unchanged);
        report.record(
            "d",
            ActionOutcome::Failed {
                reason: "boom".to_string(),
            },
        );

        assert_eq!(
            report.summary_line(),
            "installed=1 reinstalled=1 unchanged=1 failed=1"
        );
        assert!(report.has_failures());
        assert_eq!(report.outcome_of("c"), Some(&ActionOutcome::Unchanged));
    }

    #[test]
    fn planned_outcomes_render_as_hypothetical() {
        assert_eq!(
            ActionOutcome::Planned(Action::Reinstall).to_string(),
            "would reinstall"
        );
    }
}
