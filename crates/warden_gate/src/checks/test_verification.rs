// SPDX-License-Identifier: Apache-2.0

//! `test_verification`: the most recently recorded test run passed.

use std::sync::Arc;

use warden_checks::ActionLedger;

use crate::check::{db_unavailable, WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "test_verification";
const SUBSYSTEM: &str = "action ledger";

/// Queries the most recent test-run action recorded in the ledger.
pub struct TestVerificationCheck {
    ledger: Option<Arc<dyn ActionLedger>>,
}

impl TestVerificationCheck {
    /// Builds a check backed by `ledger`.
    #[must_use]
    pub fn new(ledger: Arc<dyn ActionLedger>) -> Self {
        TestVerificationCheck { ledger: Some(ledger) }
    }

    /// Builds a check with no ledger wired up; every evaluation reports the
    /// DB-unavailable sentinel.
    #[must_use]
    pub fn unavailable() -> Self {
        TestVerificationCheck { ledger: None }
    }
}

impl WorkflowCheck for TestVerificationCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, _params: &WorkflowCheckParams) -> Vec<String> {
        let Some(ledger) = &self.ledger else {
            return vec![db_unavailable(SUBSYSTEM)];
        };

        match ledger.latest_test_action() {
            Some(record) if record.ok => Vec::new(),
            Some(_) => vec!["most recent recorded test run did not pass".to_owned()],
            None => vec!["no test run recorded".to_owned()],
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
            None
        }
        fn latest_test_action(&self) -> Option<ActionRecord> {
            self.0.map(|ok| ActionRecord { ok, timestamp: SystemTime::now(), detail: None })
        }
        fn audit_failures_since(&self, _since: SystemTime) -> usize {
            0
        }
    }

    #[test]
    fn no_ledger_is_db_unavailable_sentinel() {
        let check = TestVerificationCheck::unavailable();
        assert_eq!(check.verify(&WorkflowCheckParams::new()), vec![db_unavailable(SUBSYSTEM)]);
    }

    #[test]
    fn passing_record_yields_no_violations() {
        let check = TestVerificationCheck::new(Arc::new(FakeLedger(Some(true))));
        assert!(check.verify(&WorkflowCheckParams::new()).is_empty());
    }

    #[test]
    fn failing_or_missing_record_is_a_violation() {
        let check = TestVerificationCheck::new(Arc::new(FakeLedger(Some(false))));
        assert_eq!(check.verify(&WorkflowCheckParams::new()).len(), 1);

        let check = TestVerificationCheck::new(Arc::new(FakeLedger(None)));
        assert_eq!(check.verify(&WorkflowCheckParams::new()).len(), 1);
    }
}
