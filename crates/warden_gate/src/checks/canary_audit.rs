// SPDX-License-Identifier: Apache-2.0

//! `canary_audit`: a canary/staging run passed, signaled by the caller as a
//! parameter rather than probed directly (the core has no canary-runner
//! collaborator of its own).

use crate::check::{WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "canary_audit";
const PARAM_KEY: &str = "canary_passed";

/// Checks the caller-supplied `canary_passed` boolean parameter.
#[derive(Debug, Default)]
pub struct CanaryAuditCheck;

impl WorkflowCheck for CanaryAuditCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, params: &WorkflowCheckParams) -> Vec<String> {
        match params.get_bool(PARAM_KEY) {
            Some(true) => Vec::new(),
            Some(false) => vec!["canary/staging run did not pass".to_owned()],
            None => vec![format!("{CHECK_TYPE} requires a '{PARAM_KEY}' parameter")],
        }
    }
}
