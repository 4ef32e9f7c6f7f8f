// SPDX-License-Identifier: Apache-2.0

//! `alignment_verification`: the target file must have a passing, recorded
//! alignment-verification action in the action ledger.

use std::sync::Arc;

use warden_checks::ActionLedger;

use crate::check::{db_unavailable, WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "alignment_verification";
const SUBSYSTEM: &str = "action ledger";

/// Queries the most recent alignment-verification action recorded for the
/// target file.
pub struct AlignmentVerificationCheck {
    ledger: Option<Arc<dyn ActionLedger>>,
}

impl AlignmentVerificationCheck {
    /// Builds a check backed by `ledger`.
    #[must_use]
    pub fn new(ledger: Arc<dyn ActionLedger>) -> Self {
        AlignmentVerificationCheck { ledger: Some(ledger) }
    }

    /// Builds a check with no ledger wired up; every evaluation reports the
    /// DB-unavailable sentinel.
    #[must_use]
    pub fn unavailable() -> Self {
        AlignmentVerificationCheck { ledger: None }
    }
}

impl WorkflowCheck for AlignmentVerificationCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, params: &WorkflowCheckParams) -> Vec<String> {
        let Some(file_path) = params.file_path.as_deref() else {
            return vec![format!("{CHECK_TYPE} requires a file_path parameter")];
        };

        let Some(ledger) = &self.ledger else {
            return vec![db_unavailable(SUBSYSTEM)];
        };

        match ledger.latest_alignment_action(file_path) {
            Some(record) if record.ok => Vec::new(),
            Some(_) => vec![format!("most recent alignment verification for '{file_path}' did not pass")],
            None => vec![format!("no alignment verification recorded for '{file_path}'")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;
    use warden_checks::ActionRecord;

    struct FakeLedger(Option<bool>);
    impl ActionLedger for FakeLedger {
        fn latest_alignment_action(&self, _file_path: &str) -> Option<ActionRecord> {
            self.0.map(|ok| ActionRecord { ok, timestamp: SystemTime::now(), detail: None })
        }
        fn latest_test_action(&self) -> Option<ActionRecord> {
            None
        }
        fn audit_failures_since(&self, _since: SystemTime) -> usize {
            0
        }
    }

    #[test]
    fn missing_file_path_is_a_violation() {
        let check = AlignmentVerificationCheck::new(Arc::new(FakeLedger(Some(true))));
        assert_eq!(check.verify(&WorkflowCheckParams::new()).len(), 1);
    }

    #[test]
    fn no_ledger_is_db_unavailable_sentinel() {
        let check = AlignmentVerificationCheck::unavailable();
        let violations = check.verify(&WorkflowCheckParams::new().with_file_path("src/a.py"));
        assert_eq!(violations, vec![db_unavailable(SUBSYSTEM)]);
    }

    #[test]
    fn passing_record_yields_no_violations() {
        let check = AlignmentVerificationCheck::new(Arc::new(FakeLedger(Some(true))));
        assert!(check.verify(&WorkflowCheckParams::new().with_file_path("src/a.py")).is_empty());
    }

    #[test]
    fn failing_or_missing_record_is_a_violation() {
        let check = AlignmentVerificationCheck::new(Arc::new(FakeLedger(Some(false))));
        assert_eq!(check.verify(&WorkflowCheckParams::new().with_file_path("src/a.py")).len(), 1);

        let check = AlignmentVerificationCheck::new(Arc::new(FakeLedger(None)));
        assert_eq!(check.verify(&WorkflowCheckParams::new().with_file_path("src/a.py")).len(), 1);
    }
}
