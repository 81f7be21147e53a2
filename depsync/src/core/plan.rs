//! Desired-vs-installed diffing.

use crate::core::types::{
    Action, ActionPlan, DesiredSet, IgnoreSet, InstalledPackage, InstalledSnapshot, PlannedAction,
};

/// Decide what an installed package needs to reach `desired_version`.
///
/// Versions compare as plain strings: `1.0.0` and `1.0.0-0` differ.
pub fn classify(installed: &InstalledPackage, desired_version: &str) -> Option<Action> {
    match installed.version.as_deref() {
        None => Some(Action::Install),
        Some(version) if version != desired_version => Some(Action::Reinstall),
        Some(_) => None,
    }
}

/// Build the action plan for one run.
///
/// Walks `desired` in lexicographic name order and keeps names that are also
/// in `installed` and not in `ignored`. Packages the listing does not mention
/// are left alone.
pub fn build_plan(
    desired: &DesiredSet,
    installed: &InstalledSnapshot,
    ignored: &IgnoreSet,
) -> ActionPlan {
    let mut plan = ActionPlan::default();

    for (name, desired_version) in desired {
        if ignored.contains(name) {
            continue;
        }
        let Some(pkg) = installed.get(name) else {
            continue;
        };

        match classify(pkg, desired_version) {
            Some(action) => plan.actions.push(PlannedAction {
                name: name.clone(),
                desired_version: desired_version.clone(),
                installed_version: pkg.version.clone(),
                action,
            }),
            None => plan.unchanged.push(name.clone()),
        }
    }

    plan
}
