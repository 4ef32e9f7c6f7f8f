// SPDX-License-Identifier: Apache-2.0

//! Verdict derivation from a postprocessed finding set.

use serde::{Deserialize, Serialize};
use warden_checks::Finding;
use warden_common::severity::{Enforcement, Severity};
use warden_policy::PolicyRegistry;

/// The outcome of postprocessing a finding set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// No remaining findings at all, or only advisory ones.
    Pass,
    /// At least one non-blocking finding remains, but nothing fails the audit.
    PassWithWarnings,
    /// At least one blocking, error-severity finding remains.
    Fail,
}

impl Verdict {
    /// True iff this verdict represents a passing audit (`passed` in the
    /// external schema).
    #[must_use]
    pub fn passed(self) -> bool {
        !matches!(self, Verdict::Fail)
    }
}

/// Derives the verdict for `findings`, looking up each finding's rule to
/// determine whether it is blocking.
///
/// A finding whose `check_id` no longer resolves to a registry rule (should
/// not happen in practice, since the catalog validates this at
/// construction) is treated as blocking-error, the conservative choice.
#[must_use]
pub fn derive_verdict(findings: &[Finding], registry: &PolicyRegistry) -> Verdict {
    let mut has_warning = false;

    for finding in findings {
        let enforcement = registry
            .get_rule(&finding.check_id)
            .map_or(Enforcement::Blocking, |rule| rule.enforcement);

        if finding.severity == Severity::Error && enforcement == Enforcement::Blocking {
            return Verdict::Fail;
        }
        has_warning = true;
    }

    if has_warning {
        Verdict::PassWithWarnings
    } else {
        Verdict::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_findings_is_pass() {
        let registry = warden_policy::PolicyRegistry::default();
        assert_eq!(derive_verdict(&[], &registry), Verdict::Pass);
    }
}
