//! Reconciliation behavior tests driven through a scripted command runner.
//!
//! Each test feeds a canned `npm ls --json` listing, runs `reconcile`, and
//! checks exactly which package-manager commands were issued.

use depsync::core::types::ActionOutcome;
use depsync::io::package_manager::PackageManager;
use depsync::reconcile::{ReconcileOptions, reconcile};
use depsync::test_support::{ScriptedRunner, desired, npm_listing};

const LIST: &str = "npm ls --json --depth=0";

fn mutations(runner: &ScriptedRunner) -> Vec<String> {
    runner
        .commands()
        .into_iter()
        .filter(|cmd| cmd != LIST)
        .collect()
}

#[test]
fn matching_versions_issue_no_commands() {
    let runner = ScriptedRunner::new().ok_with_stdout(
        "npm ls",
        &npm_listing(&[("d3", Some("5.7.0")), ("react", Some("16.6.3"))]),
    );

    let report = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("d3", "5.7.0"), ("react", "16.6.3")]),
        None,
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert_eq!(runner.commands(), vec![LIST]);
    assert_eq!(
        report.outcomes,
        vec![
            ("d3".to_string(), ActionOutcome::Unchanged),
            ("react".to_string(), ActionOutcome::Unchanged),
        ]
    );
}

#[test]
fn mismatched_version_is_removed_then_installed_once() {
    let runner = ScriptedRunner::new()
        .ok_with_stdout("npm ls", &npm_listing(&[("left-pad", Some("1.0.0"))]));

    reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("left-pad", "2.0.0")]),
        None,
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert_eq!(
        mutations(&runner),
        vec![
            "npm remove left-pad",
            "npm install --save-exact left-pad@2.0.0"
        ]
    );
}

#[test]
fn prerelease_suffix_counts_as_mismatch() {
    let runner = ScriptedRunner::new()
        .ok_with_stdout("npm ls", &npm_listing(&[("left-pad", Some("1.0.0-0"))]));

    let report = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("left-pad", "1.0.0")]),
        None,
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert_eq!(
        report.outcome_of("left-pad"),
        Some(&ActionOutcome::Reinstalled)
    );
}

#[test]
fn unresolved_package_is_installed_without_remove() {
    let runner =
        ScriptedRunner::new().fail_with_stdout("npm ls", &npm_listing(&[("mobx", None)]));

    let report = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("mobx", "5.7.0")]),
        None,
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert_eq!(
        mutations(&runner),
        vec!["npm install --save-exact mobx@5.7.0"]
    );
    assert!(runner.commands_starting_with("npm remove").is_empty());
    assert_eq!(report.outcome_of("mobx"), Some(&ActionOutcome::Installed));
}

#[test]
fn ignored_package_is_untouched() {
    let runner = ScriptedRunner::new()
        .ok_with_stdout("npm ls", &npm_listing(&[("react", Some("15.0.0"))]));

    let report = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("react", "16.6.3")]),
        Some("react"),
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert!(mutations(&runner).is_empty());
    assert!(report.outcomes.is_empty());
}

#[test]
fn failed_remove_does_not_stop_later_packages() {
    let runner = ScriptedRunner::new()
        .ok_with_stdout(
            "npm ls",
            &npm_listing(&[("alpha", Some("1.0.0")), ("beta", Some("1.0.0"))]),
        )
        .fail("npm remove alpha", "npm ERR! code EPERM");

    let report = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("alpha", "2.0.0"), ("beta", "2.0.0")]),
        None,
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert_eq!(
        mutations(&runner),
        vec![
            "npm remove alpha",
            "npm remove beta",
            "npm install --save-exact beta@2.0.0",
        ]
    );
    assert!(
        report
            .outcome_of("alpha")
            .is_some_and(ActionOutcome::is_failed)
    );
    assert_eq!(report.outcome_of("beta"), Some(&ActionOutcome::Reinstalled));
    assert_eq!(
        report.summary_line(),
        "installed=0 reinstalled=1 unchanged=0 failed=1"
    );
}

#[test]
fn unparsable_listing_aborts_before_any_mutation() {
    let runner = ScriptedRunner::new().fail_with_stdout("npm ls", "npm ERR! code ELSPROBLEMS");

    let err = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("d3", "5.7.0")]),
        None,
        ReconcileOptions::default(),
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("parse dependency listing"));
    assert_eq!(runner.commands(), vec![LIST]);
}

#[test]
fn listing_without_dependencies_is_a_no_op() {
    let runner = ScriptedRunner::new().ok_with_stdout("npm ls", r#"{"name": "empty"}"#);

    let report = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("d3", "5.7.0")]),
        None,
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert!(report.outcomes.is_empty());
    assert_eq!(runner.commands(), vec![LIST]);
}

/// d3 is wrong, react is wrong but ignored, lodash is not configured.
#[test]
fn mixed_project_end_to_end() {
    let runner = ScriptedRunner::new().ok_with_stdout(
        "npm ls",
        &npm_listing(&[
            ("d3", Some("4.0.0")),
            ("react", Some("15.0.0")),
            ("lodash", Some("4.17.0")),
        ]),
    );

    let report = reconcile(
        &runner,
        &PackageManager::npm(),
        &desired(&[("d3", "5.7.0"), ("react", "16.6.3")]),
        Some("react"),
        ReconcileOptions::default(),
    )
    .expect("reconcile");

    assert_eq!(
        mutations(&runner),
        vec!["npm remove d3", "npm install --save-exact d3@5.7.0"]
    );
    assert_eq!(
        report.outcomes,
        vec![("d3".to_string(), ActionOutcome::Reinstalled)]
    );
}

#[test]
fn second_run_after_convergence_is_idempotent() {
    let want = desired(&[("d3", "5.7.0"), ("mobx", "5.7.0")]);

    let first = ScriptedRunner::new().ok_with_stdout(
        "npm ls",
        &npm_listing(&[("d3", Some("4.0.0")), ("mobx", None)]),
    );
    reconcile(
        &first,
        &PackageManager::npm(),
        &want,
        None,
        ReconcileOptions::default(),
    )
    .expect("first run");
    assert_eq!(mutations(&first).len(), 3);

    let second = ScriptedRunner::new().ok_with_stdout(
        "npm ls",
        &npm_listing(&[("d3", Some("5.7.0")), ("mobx", Some("5.7.0"))]),
    );
    reconcile(
        &second,
        &PackageManager::npm(),
        &want,
        None,
        ReconcileOptions::default(),
    )
    .expect("second run");
    assert!(mutations(&second).is_empty());
}
