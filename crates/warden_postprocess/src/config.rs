// SPDX-License-Identifier: Apache-2.0

//! Declared entry-point-downgrade and auto-ignore rules.

use serde::{Deserialize, Serialize};

/// A rule allowing an error-severity finding on an entry-point symbol to be
/// downgraded to a warning (e.g. "unused function" on a CLI command).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowngradeRule {
    /// The rule id eligible for downgrade.
    pub rule_id: String,
}

/// A rule that moves matching findings to the ignored bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoreRule {
    /// The rule id this ignore rule applies to.
    pub rule_id: String,
    /// Human-readable justification recorded alongside the ignored finding.
    pub reason: String,
}

/// The full set of postprocessor configuration declared by policy
/// documents or the CLI caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostprocessConfig {
    /// Entry-point downgrade rules.
    pub downgrade_rules: Vec<DowngradeRule>,
    /// Auto-ignore rules.
    pub ignore_rules: Vec<IgnoreRule>,
}
