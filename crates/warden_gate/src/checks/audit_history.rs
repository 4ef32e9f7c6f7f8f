// SPDX-License-Identifier: Apache-2.0

//! `audit_history`: no failed audits recorded in a rolling window.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use warden_checks::ActionLedger;

use crate::check::{db_unavailable, WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "audit_history";
const SUBSYSTEM: &str = "action ledger";
const DEFAULT_WINDOW: Duration = Duration::from_secs(7 * 24 * 3600);

/// Counts failed audits recorded in the trailing window (default 7 days).
pub struct AuditHistoryCheck {
    ledger: Option<Arc<dyn ActionLedger>>,
    window: Duration,
}

impl AuditHistoryCheck {
    /// Builds a check backed by `ledger` with the default 7-day window.
    #[must_use]
    pub fn new(ledger: Arc<dyn ActionLedger>) -> Self {
        AuditHistoryCheck { ledger: Some(ledger), window: DEFAULT_WINDOW }
    }

    /// Builds a check with an explicit rolling window.
    #[must_use]
    pub fn with_window(ledger: Arc<dyn ActionLedger>, window: Duration) -> Self {
        AuditHistoryCheck { ledger: Some(ledger), window }
    }

    /// Builds a check with no ledger wired up.
    #[must_use]
    pub fn unavailable() -> Self {
        AuditHistoryCheck { ledger: None, window: DEFAULT_WINDOW }
    }
}

impl WorkflowCheck for AuditHistoryCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, _params: &WorkflowCheckParams) -> Vec<String> {
        let Some(ledger) = &self.ledger else {
            return vec![db_unavailable(SUBSYSTEM)];
        };

        let since = SystemTime::now().checked_sub(self.window).unwrap_or(SystemTime::UNIX_EPOCH);
        let failures = ledger.audit_failures_since(since);
        if failures == 0 {
            Vec::new()
        } else {
            vec![format!("{failures} failed audit(s) recorded in the last {}s", self.window.as_secs())]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_checks::ActionRecord;

    struct FakeLedger(usize);
    impl ActionLedger for FakeLedger {
        fn latest_alignment_action(&self, _file_path: &str) -> Option<ActionRecord> {
            None
        }
        fn latest_test_action(&self) -> Option<ActionRecord> {
            None
        }
        fn audit_failures_since(&self, _since: SystemTime) -> usize {
            self.0
        }
    }

    #[test]
    fn zero_failures_is_clean() {
        let check = AuditHistoryCheck::new(Arc::new(FakeLedger(0)));
        assert!(check.verify(&WorkflowCheckParams::new()).is_empty());
    }

    #[test]
    fn nonzero_failures_is_a_violation() {
        let check = AuditHistoryCheck::new(Arc::new(FakeLedger(2)));
        assert_eq!(check.verify(&WorkflowCheckParams::new()).len(), 1);
    }
}
