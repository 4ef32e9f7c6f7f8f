// SPDX-License-Identifier: Apache-2.0

//! Builds the (check × target) work queue and dispatches it across a
//! `rayon` thread pool, the same "many small independent units of work"
//! idiom the teacher uses to resolve a registry's definitions in parallel.

use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use warden_checks::checks::python_scan::discover_python_files;
use warden_checks::{AuditContext, Finding, RuleCheck, Target, TargetScope};

/// One dispatched (check, target) pair's outcome.
struct DispatchOutcome {
    rule_ids: Vec<String>,
    findings: Vec<Finding>,
    crashed: bool,
}

/// Runs every check in `checks` against every target its scope selects,
/// returning the flattened findings, the rule ids that ran (whether or not
/// they crashed), and the rule ids that crashed.
pub(crate) fn dispatch(
    context: &AuditContext,
    checks: &[&dyn RuleCheck],
) -> (Vec<Finding>, BTreeSet<String>, BTreeSet<String>) {
    let file_targets = discover_file_targets(context);
    let work_items = build_work_items(checks, &file_targets);

    let outcomes: Vec<DispatchOutcome> = work_items
        .into_par_iter()
        .map(|(check, target)| run_one(context, check, &target))
        .collect();

    let mut findings = Vec::new();
    let mut executed_rule_ids = BTreeSet::new();
    let mut crashed_rule_ids = BTreeSet::new();

    for outcome in outcomes {
        executed_rule_ids.extend(outcome.rule_ids.iter().cloned());
        if outcome.crashed {
            crashed_rule_ids.extend(outcome.rule_ids);
        }
        findings.extend(outcome.findings);
    }

    (findings, executed_rule_ids, crashed_rule_ids)
}

fn discover_file_targets(context: &AuditContext) -> Vec<String> {
    discover_python_files(&context.repo_path)
        .into_iter()
        .map(|path| {
            context
                .path_resolver
                .repo_relative(&path)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

fn build_work_items<'a>(
    checks: &[&'a dyn RuleCheck],
    file_targets: &[String],
) -> Vec<(&'a dyn RuleCheck, Target)> {
    let mut items = Vec::new();
    for &check in checks {
        match check.target_scope() {
            TargetScope::Global => items.push((check, Target::Global)),
            TargetScope::Tree => {
                for name in check.tree_targets() {
                    items.push((check, Target::Tree(name)));
                }
            }
            TargetScope::File => {
                for file in file_targets {
                    items.push((check, Target::File(file.clone())));
                }
            }
        }
    }
    items
}

fn run_one(context: &AuditContext, check: &dyn RuleCheck, target: &Target) -> DispatchOutcome {
    let rule_ids: Vec<String> = check.rule_ids().to_vec();
    match catch_unwind(AssertUnwindSafe(|| check.verify(context, target))) {
        Ok(findings) => DispatchOutcome {
            rule_ids,
            findings,
            crashed: false,
        },
        Err(payload) => {
            let message = panic_message(&payload);
            DispatchOutcome {
                rule_ids,
                findings: vec![Finding::crash(format!(
                    "check '{}' panicked: {message}",
                    check.category()
                ))],
                crashed: true,
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
