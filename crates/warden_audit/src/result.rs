// SPDX-License-Identifier: Apache-2.0

//! The immutable output of one auditor run.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_checks::Finding;
use warden_postprocess::{IgnoredFinding, Verdict};

/// Counts published alongside a verdict, computed from one audit pass over
/// one set of dispatched checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct AuditStats {
    /// Every rule the policy registry declares.
    pub total_declared_rules: usize,
    /// Rules with a bound engine (checkable in principle).
    pub total_executable_rules: usize,
    /// Rules whose check actually ran this pass (crashed or not).
    pub executed_dynamic_rules: usize,
    /// Rules whose check panicked instead of returning normally.
    pub crashed_rules: usize,
    /// Rules declaring an engine name no catalog check binds to.
    pub unmapped_rules: usize,
    /// `executed_dynamic_rules / total_executable_rules * 100`.
    pub coverage_percent: f64,
    /// Same, but with crashed rules subtracted from the numerator.
    pub effective_coverage_percent: f64,
}

/// The immutable result of one auditor run: every surviving finding, the
/// rules that ran, the verdict, and the stats block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    /// Unique id for this run.
    pub audit_id: Uuid,
    /// When the run completed, in UTC.
    pub timestamp: DateTime<Utc>,
    /// Findings surviving the postprocessor, sorted for readability.
    pub findings: Vec<Finding>,
    /// Findings the postprocessor auto-ignored, with their reasons.
    pub ignored: Vec<IgnoredFinding>,
    /// Union of rule ids whose check ran to completion or crashed.
    pub executed_rule_ids: BTreeSet<String>,
    /// The stats block.
    pub stats: AuditStats,
    /// The overall verdict.
    pub verdict: Verdict,
}

impl AuditResult {
    /// `true` unless the verdict is `FAIL`.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict.passed()
    }
}
