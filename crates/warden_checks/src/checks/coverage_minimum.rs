// SPDX-License-Identifier: Apache-2.0

//! Coverage Minimum: reads `coverage.json`'s `totals.percent_covered` (or a
//! caller-supplied override) and emits one violation if it falls below the
//! constitutional threshold.

use warden_common::severity::Severity;

use crate::check::{RuleCheck, Target, TargetScope};
use crate::context::AuditContext;
use crate::finding::Finding;

const RULE_ID: &str = "core.coverage.minimum";
const DEFAULT_THRESHOLD_PERCENT: f64 = 75.0;

/// Enforces a minimum line-coverage percentage.
pub struct CoverageMinimumCheck {
    rule_ids: Vec<String>,
    threshold_percent: f64,
    override_percent: Option<f64>,
}

impl Default for CoverageMinimumCheck {
    fn default() -> Self {
        CoverageMinimumCheck {
            rule_ids: vec![RULE_ID.to_owned()],
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            override_percent: None,
        }
    }
}

impl CoverageMinimumCheck {
    /// Builds a check with a caller-supplied coverage percent, bypassing
    /// `coverage.json` entirely.
    #[must_use]
    pub fn with_override(percent: f64) -> Self {
        CoverageMinimumCheck {
            override_percent: Some(percent),
            ..Default::default()
        }
    }
}

impl RuleCheck for CoverageMinimumCheck {
    fn rule_ids(&self) -> &[String] {
        &self.rule_ids
    }

    fn category(&self) -> &str {
        "coverage_minimum"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Global
    }

    fn verify(&self, context: &AuditContext, _target: &Target) -> Vec<Finding> {
        let percent = match self.override_percent {
            Some(p) => Some(p),
            None => read_coverage_json(context),
        };

        match percent {
            None => Vec::new(),
            Some(p) if p >= self.threshold_percent => Vec::new(),
            Some(p) => vec![Finding::new(
                RULE_ID,
                Severity::Error,
                format!(
                    "coverage {p:.1}% is below the required minimum of {:.1}%",
                    self.threshold_percent
                ),
            )],
        }
    }
}

fn read_coverage_json(context: &AuditContext) -> Option<f64> {
    let path = context.path_resolver.resolve("coverage.json");
    let contents = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&contents).ok()?;
    value
        .get("totals")
        .and_then(|t| t.get("percent_covered"))
        .and_then(serde_json::Value::as_f64)
}
