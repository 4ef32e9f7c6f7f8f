// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

pub mod check;
pub mod checks;
pub mod gate;

pub use check::{db_unavailable, WorkflowCheck, WorkflowCheckParams};
pub use gate::{GateOutcome, WorkflowGate};

use std::sync::Arc;

use warden_checks::ActionLedger;
use warden_common::subprocess::Semaphore;

/// The eight built-in `WorkflowCheck`s, wired up with a shared subprocess
/// semaphore and an optional action ledger.
///
/// Passing `ledger = None` builds the DB-backed checks in their
/// `unavailable()` form: they will always report the DB-unavailable
/// sentinel rather than silently skipping.
#[must_use]
pub fn default_checks(semaphore: Arc<Semaphore>, ledger: Option<Arc<dyn ActionLedger>>) -> Vec<Box<dyn WorkflowCheck>> {
    let (alignment, history, tests) = match ledger {
        Some(ledger) => (
            checks::alignment_verification::AlignmentVerificationCheck::new(Arc::clone(&ledger)),
            checks::audit_history::AuditHistoryCheck::new(Arc::clone(&ledger)),
            checks::test_verification::TestVerificationCheck::new(ledger),
        ),
        None => (
            checks::alignment_verification::AlignmentVerificationCheck::unavailable(),
            checks::audit_history::AuditHistoryCheck::unavailable(),
            checks::test_verification::TestVerificationCheck::unavailable(),
        ),
    };

    vec![
        Box::new(alignment),
        Box::new(history),
        Box::new(checks::canary_audit::CanaryAuditCheck),
        Box::new(checks::coverage_minimum::CoverageMinimumCheck),
        Box::new(checks::dead_code_check::DeadCodeCheck::new(Arc::clone(&semaphore))),
        Box::new(checks::import_resolution_check::ImportResolutionCheck::new(Arc::clone(&semaphore))),
        Box::new(checks::linter_compliance::LinterComplianceCheck::new(semaphore)),
        Box::new(tests),
    ]
}
