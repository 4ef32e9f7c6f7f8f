// SPDX-License-Identifier: Apache-2.0

//! `Policy` and `Rule`, the normalized, document-shape-independent form
//! every downstream component consumes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use warden_common::severity::{Authority, Enforcement, Severity};

/// A check binding declared on a rule, e.g. `{engine: "DocstringCheck"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EngineBinding {
    /// Name of the check implementation that enforces this rule.
    pub engine: String,
}

/// A single enforceable statement, normalized from either document shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    /// Stable identifier, dotted form strongly preferred (`code.imports.must_resolve`).
    pub rule_id: String,
    /// Human-readable statement of the rule.
    pub statement: String,
    /// How serious a violation of this rule is.
    pub severity: Severity,
    /// Whether a violation blocks, is only reported, or is merely advisory.
    pub enforcement: Enforcement,
    /// The check implementation bound to this rule, if any.
    pub engine: Option<EngineBinding>,
    /// Free-form grouping label (e.g. `naming`, `imports`).
    pub category: Option<String>,
    /// `policy_id` of the policy this rule was declared under.
    pub policy_id: String,
}

impl Rule {
    /// True when the rule has no bound check and can never contribute a finding.
    #[must_use]
    pub fn is_declared_only(&self) -> bool {
        self.engine.is_none()
    }
}

/// A document grouping rules under a single identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Policy {
    /// Stable identifier, unique across the registry.
    pub policy_id: String,
    /// Human-readable title.
    pub title: String,
    /// Free-form version string as declared in the document.
    pub version: String,
    /// Ordinal priority of this policy's source, documentation only.
    pub authority: Authority,
    /// The rules declared directly under this policy.
    pub rule_ids: Vec<String>,
}
