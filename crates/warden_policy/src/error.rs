// SPDX-License-Identifier: Apache-2.0

use miette::Diagnostic;
use serde::Serialize;
use warden_common::error::AggregateError;

/// Fatal and warning conditions raised while loading the policy registry.
///
/// Fatal variants abort the load outright (`DuplicatePolicy`, `DuplicateRule`,
/// `InvalidEnforcementSeverityCombo`). `UnparseableDocument` is collected as a
/// non-fatal warning: the offending file is skipped and the load continues.
#[derive(thiserror::Error, Debug, Serialize, Diagnostic, Clone)]
#[must_use]
#[non_exhaustive]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyError {
    /// Two policy documents declared the same `policy_id`.
    #[error("duplicate policy id '{policy_id}' (first seen at {first_path}, again at {second_path})")]
    #[diagnostic(help("give each policy document a unique policy_id"))]
    DuplicatePolicy {
        /// The id that was declared twice.
        policy_id: String,
        /// Path of the document that declared it first.
        first_path: String,
        /// Path of the document that declared it again.
        second_path: String,
    },

    /// Two rules (possibly across documents) declared the same `rule_id`.
    #[error("duplicate rule id '{rule_id}' (first seen in policy '{first_policy}', again in '{second_policy}')")]
    #[diagnostic(help("give each rule a unique rule_id"))]
    DuplicateRule {
        /// The id that was declared twice.
        rule_id: String,
        /// Policy id that declared it first.
        first_policy: String,
        /// Policy id that declared it again.
        second_policy: String,
    },

    /// A rule declared `enforcement=blocking` without `severity=error`.
    #[error("rule '{rule_id}' declares enforcement=blocking but severity={severity}, blocking rules must be severity=error")]
    #[diagnostic(help("set severity: error, or relax enforcement to reporting/advisory"))]
    InvalidEnforcementSeverityCombo {
        /// The offending rule.
        rule_id: String,
        /// The severity it declared instead of `error`.
        severity: String,
    },

    /// A policy document could not be parsed as YAML or JSON.
    #[error("could not parse policy document '{path}': {error}")]
    #[diagnostic(help("check the document for YAML/JSON syntax errors"))]
    UnparseableDocument {
        /// Path of the offending document.
        path: String,
        /// The underlying parser error, rendered as text.
        error: String,
    },

    /// A directory could not be walked (permissions, I/O error, etc).
    #[error("could not read constitutional root '{path}': {error}")]
    Unreadable {
        /// The directory that could not be read.
        path: String,
        /// The underlying I/O error, rendered as text.
        error: String,
    },

    /// A compound error aggregating every fatal error seen during a load.
    #[error("{} fatal error(s) loading policy registry", .0.len())]
    Compound(Vec<PolicyError>),
}

impl AggregateError<PolicyError> for PolicyError {
    fn compound(errors: Vec<PolicyError>) -> PolicyError {
        let flattened = errors
            .into_iter()
            .flat_map(|e| match e {
                PolicyError::Compound(inner) => inner,
                other => vec![other],
            })
            .collect();
        PolicyError::Compound(flattened)
    }
}

/// Error raised when a caller-provided short name cannot be resolved to a
/// backing policy document.
#[derive(thiserror::Error, Debug, Serialize, Diagnostic, Clone)]
#[error("no policy document matches '{name}'")]
pub struct FileNotFoundError {
    /// The name the caller tried to resolve.
    pub name: String,
}
