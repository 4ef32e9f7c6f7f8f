// SPDX-License-Identifier: Apache-2.0

//! The gate itself: aggregates every configured check's violations and
//! decides admission.

use crate::check::{WorkflowCheck, WorkflowCheckParams};

/// The terminal outcome of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The aggregate violation list was empty; the workflow may proceed.
    Admitted,
    /// At least one check reported a violation; the operation is terminal.
    Rejected(Vec<String>),
}

impl GateOutcome {
    /// `true` iff this outcome is `Admitted`.
    #[must_use]
    pub fn admitted(&self) -> bool {
        matches!(self, GateOutcome::Admitted)
    }
}

/// An ordered set of `WorkflowCheck`s guarding one workflow operation.
///
/// Every operation moves through `requested -> gating -> (admitted |
/// rejected)`; `requested` and `gating` are transient (there is no
/// observable state between constructing a gate and calling
/// [`WorkflowGate::evaluate`]), so the type only materializes the terminal
/// states as [`GateOutcome`].
pub struct WorkflowGate {
    checks: Vec<Box<dyn WorkflowCheck>>,
}

impl WorkflowGate {
    /// Builds a gate from an explicit, ordered list of checks.
    #[must_use]
    pub fn new(checks: Vec<Box<dyn WorkflowCheck>>) -> Self {
        WorkflowGate { checks }
    }

    /// The checks configured on this gate, in evaluation order.
    pub fn checks(&self) -> impl Iterator<Item = &dyn WorkflowCheck> {
        self.checks.iter().map(AsRef::as_ref)
    }

    /// Runs every configured check against `params` and aggregates the
    /// result. The gate admits iff the aggregate violation list is empty.
    #[must_use]
    pub fn evaluate(&self, params: &WorkflowCheckParams) -> GateOutcome {
        let violations: Vec<String> = self.checks.iter().flat_map(|check| check.verify(params)).collect();
        if violations.is_empty() {
            GateOutcome::Admitted
        } else {
            GateOutcome::Rejected(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysOk;
    impl WorkflowCheck for AlwaysOk {
        fn check_type(&self) -> &str {
            "always_ok"
        }
        fn verify(&self, _params: &WorkflowCheckParams) -> Vec<String> {
            Vec::new()
        }
    }

    struct AlwaysViolates(&'static str);
    impl WorkflowCheck for AlwaysViolates {
        fn check_type(&self) -> &str {
            "always_violates"
        }
        fn verify(&self, _params: &WorkflowCheckParams) -> Vec<String> {
            vec![self.0.to_owned()]
        }
    }

    #[test]
    fn admits_when_every_check_is_silent() {
        let gate = WorkflowGate::new(vec![Box::new(AlwaysOk), Box::new(AlwaysOk)]);
        let outcome = gate.evaluate(&WorkflowCheckParams::new());
        assert_eq!(outcome, GateOutcome::Admitted);
        assert!(outcome.admitted());
    }

    #[test]
    fn rejects_and_aggregates_every_violation() {
        let gate = WorkflowGate::new(vec![
            Box::new(AlwaysOk),
            Box::new(AlwaysViolates("src/a.py:10:1: F401 unused import")),
        ]);
        let outcome = gate.evaluate(&WorkflowCheckParams::new());
        match outcome {
            GateOutcome::Rejected(violations) => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("F401"));
            }
            GateOutcome::Admitted => panic!("expected rejection"),
        }
    }
}
