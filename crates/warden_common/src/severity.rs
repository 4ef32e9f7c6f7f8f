// SPDX-License-Identifier: Apache-2.0

//! Severity and enforcement sum types shared by the policy registry, the
//! checks, and the finding postprocessor.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The severity of a rule or a finding, strictly orderable
/// (`Info < Warning < Error`) per the data model's invariant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Should be addressed but does not fail an audit on its own.
    Warning,
    /// Fails an audit when paired with `Enforcement::Blocking`.
    Error,
}

impl Severity {
    /// Normalizes a caller-provided severity string.
    ///
    /// Case-insensitive; `warn` is accepted as an alias for `warning`.
    /// Anything unrecognized normalizes to `Info`, per the registry's
    /// documented load-time normalization policy.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "error" => Severity::Error,
            "warning" | "warn" => Severity::Warning,
            "info" | "information" => Severity::Info,
            _ => Severity::Info,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// The enforcement class of a rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Observed but not required; never contributes to a failing verdict.
    Advisory,
    /// Surfaced in reports but does not gate a workflow by itself.
    Reporting,
    /// A single blocking-error finding yields verdict `FAIL`.
    Blocking,
}

impl Enforcement {
    /// Normalizes a caller-provided enforcement string.
    /// Anything unrecognized normalizes to `Advisory`.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "blocking" => Enforcement::Blocking,
            "reporting" => Enforcement::Reporting,
            _ => Enforcement::Advisory,
        }
    }
}

impl std::fmt::Display for Enforcement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Enforcement::Advisory => write!(f, "advisory"),
            Enforcement::Reporting => write!(f, "reporting"),
            Enforcement::Blocking => write!(f, "blocking"),
        }
    }
}

/// The authority level of a policy document, used for documentation
/// purposes only — it is never used to compute precedence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    /// Highest authority: governs the governance system itself.
    Meta,
    /// The constitutional document tree.
    Constitution,
    /// An ordinary policy document.
    Policy,
    /// Rules embedded alongside source code.
    Code,
}

impl Authority {
    /// Normalizes a caller-provided authority string, defaulting to `Policy`.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "meta" => Authority::Meta,
            "constitution" => Authority::Constitution,
            "code" => Authority::Code,
            _ => Authority::Policy,
        }
    }
}
