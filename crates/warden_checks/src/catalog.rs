// SPDX-License-Identifier: Apache-2.0

//! Maps rule ids to the concrete `RuleCheck` implementations that enforce
//! them.

use miette::Diagnostic;
use regex::Regex;
use serde::Serialize;
use warden_policy::PolicyRegistry;

use crate::check::RuleCheck;

/// Fatal error raised when building a catalog against a policy registry.
#[derive(thiserror::Error, Debug, Serialize, Diagnostic, Clone)]
#[error("check in category '{category}' declares unknown rule id '{rule_id}'")]
#[diagnostic(help(
    "either declare this rule in a policy document, or remove it from the check's rule_ids"
))]
pub struct CatalogError {
    /// The rule id the check declared that has no backing rule.
    pub rule_id: String,
    /// The category of the offending check, for diagnosis.
    pub category: String,
}

/// The set of checks known for a run, validated against a policy registry.
pub struct Catalog {
    checks: Vec<Box<dyn RuleCheck>>,
}

impl Catalog {
    /// Builds a catalog from an explicit list of checks, refusing to
    /// register any check whose declared rule ids are not all present in
    /// `registry`.
    pub fn new(
        checks: Vec<Box<dyn RuleCheck>>,
        registry: &PolicyRegistry,
    ) -> Result<Catalog, CatalogError> {
        for check in &checks {
            for rule_id in check.rule_ids() {
                if registry.get_rule(rule_id).is_none() {
                    return Err(CatalogError {
                        rule_id: rule_id.clone(),
                        category: check.category().to_owned(),
                    });
                }
            }
        }
        Ok(Catalog { checks })
    }

    /// Builds a catalog from every built-in check implementation.
    pub fn with_default_checks(registry: &PolicyRegistry) -> Result<Catalog, CatalogError> {
        Catalog::new(crate::checks::default_checks(registry), registry)
    }

    /// Every check in the catalog, in registration order.
    pub fn all(&self) -> impl Iterator<Item = &dyn RuleCheck> {
        self.checks.iter().map(AsRef::as_ref)
    }

    /// Checks that declare `rule_id` among their `rule_ids`.
    #[must_use]
    pub fn checks_for_rule(&self, rule_id: &str) -> Vec<&dyn RuleCheck> {
        self.all()
            .filter(|c| c.rule_ids().iter().any(|r| r == rule_id))
            .collect()
    }

    /// Checks that declare at least one rule id matching any of `patterns`.
    #[must_use]
    pub fn checks_matching_patterns(&self, patterns: &[Regex]) -> Vec<&dyn RuleCheck> {
        self.all()
            .filter(|c| {
                c.rule_ids()
                    .iter()
                    .any(|r| patterns.iter().any(|p| p.is_match(r)))
            })
            .collect()
    }

    /// Checks that declare at least one rule id belonging to `policy_id`.
    #[must_use]
    pub fn checks_matching_policy<'a>(
        &'a self,
        registry: &PolicyRegistry,
        policy_id: &str,
    ) -> Vec<&'a dyn RuleCheck> {
        self.all()
            .filter(|c| {
                c.rule_ids().iter().any(|r| {
                    registry
                        .get_rule(r)
                        .is_some_and(|rule| rule.policy_id == policy_id)
                })
            })
            .collect()
    }

    /// Number of checks registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True when no checks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{Target, TargetScope};
    use crate::context::AuditContext;
    use crate::finding::Finding;

    struct StubCheck {
        rule_ids: Vec<String>,
    }

    impl RuleCheck for StubCheck {
        fn rule_ids(&self) -> &[String] {
            &self.rule_ids
        }
        fn category(&self) -> &str {
            "stub"
        }
        fn target_scope(&self) -> TargetScope {
            TargetScope::Global
        }
        fn verify(&self, _context: &AuditContext, _target: &Target) -> Vec<Finding> {
            Vec::new()
        }
    }

    fn registry_with_rule(rule_id: &str) -> PolicyRegistry {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("demo.json"),
            format!(r#"{{"id": "demo", "rules": [{{"id": "{rule_id}", "statement": "x", "severity": "info"}}]}}"#),
        )
        .expect("write");
        PolicyRegistry::load(dir.path()).expect("load").0
    }

    #[test]
    fn refuses_a_check_declaring_an_unknown_rule() {
        let registry = registry_with_rule("demo.known");
        let check: Box<dyn RuleCheck> = Box::new(StubCheck {
            rule_ids: vec!["demo.unknown".to_owned()],
        });
        let result = Catalog::new(vec![check], &registry);
        assert!(result.is_err());
    }

    #[test]
    fn checks_for_rule_finds_registered_check() {
        let registry = registry_with_rule("demo.known");
        let check: Box<dyn RuleCheck> = Box::new(StubCheck {
            rule_ids: vec!["demo.known".to_owned()],
        });
        let catalog = Catalog::new(vec![check], &registry).expect("catalog");
        assert_eq!(catalog.checks_for_rule("demo.known").len(), 1);
        assert_eq!(catalog.checks_for_rule("demo.other").len(), 0);
    }

    #[test]
    fn checks_matching_patterns_filters_by_regex() {
        let registry = registry_with_rule("demo.known");
        let check: Box<dyn RuleCheck> = Box::new(StubCheck {
            rule_ids: vec!["demo.known".to_owned()],
        });
        let catalog = Catalog::new(vec![check], &registry).expect("catalog");
        let matching = vec![Regex::new(r"^demo\.").expect("regex")];
        assert_eq!(catalog.checks_matching_patterns(&matching).len(), 1);
        let non_matching = vec![Regex::new(r"^other\.").expect("regex")];
        assert_eq!(catalog.checks_matching_patterns(&non_matching).len(), 0);
    }
}
