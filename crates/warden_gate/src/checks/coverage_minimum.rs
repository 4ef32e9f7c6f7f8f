// SPDX-License-Identifier: Apache-2.0

//! `coverage_minimum`: the same contract as the audit-side
//! `core.coverage.minimum` rule, exposed as a workflow-gate probe so a
//! workflow can be gated on coverage without a full audit pass.

use crate::check::{WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "coverage_minimum";
const DEFAULT_THRESHOLD_PERCENT: f64 = 75.0;
const PARAM_THRESHOLD: &str = "threshold_percent";
const PARAM_OVERRIDE: &str = "coverage_percent";

/// Reads `coverage.json` under the gate's repo path (or a caller-supplied
/// override) and violates if it falls below the threshold.
#[derive(Debug, Default)]
pub struct CoverageMinimumCheck;

impl WorkflowCheck for CoverageMinimumCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, params: &WorkflowCheckParams) -> Vec<String> {
        let threshold = params.get_f64(PARAM_THRESHOLD).unwrap_or(DEFAULT_THRESHOLD_PERCENT);

        let percent = match params.get_f64(PARAM_OVERRIDE) {
            Some(p) => Some(p),
            None => params.repo_path.as_deref().and_then(read_coverage_json),
        };

        match percent {
            None => Vec::new(),
            Some(p) if p >= threshold => Vec::new(),
            Some(p) => vec![format!("coverage {p:.1}% is below the required minimum of {threshold:.1}%")],
        }
    }
}

fn read_coverage_json(repo_path: &str) -> Option<f64> {
    let path = std::path::Path::new(repo_path).join("coverage.json");
    let contents = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&contents).ok()?;
    value.get("totals").and_then(|t| t.get("percent_covered")).and_then(serde_json::Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_below_threshold_is_a_violation() {
        let check = CoverageMinimumCheck;
        let params = WorkflowCheckParams::new().with_value(PARAM_OVERRIDE, 40.0);
        assert_eq!(check.verify(&params).len(), 1);
    }

    #[test]
    fn override_above_threshold_is_clean() {
        let check = CoverageMinimumCheck;
        let params = WorkflowCheckParams::new().with_value(PARAM_OVERRIDE, 99.0);
        assert!(check.verify(&params).is_empty());
    }

    #[test]
    fn missing_coverage_source_is_clean_not_a_crash() {
        let check = CoverageMinimumCheck;
        assert!(check.verify(&WorkflowCheckParams::new()).is_empty());
    }
}
