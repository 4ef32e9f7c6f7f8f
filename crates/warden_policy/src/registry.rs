// SPDX-License-Identifier: Apache-2.0

//! The loaded, validated registry of policies and rules.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use warden_common::error::handle_errors;
use warden_common::severity::{Enforcement, Severity};

use crate::error::{FileNotFoundError, PolicyError};
use crate::loader::{discover_documents, normalize, parse_document};
use crate::model::{Policy, Rule};

/// The immutable, post-load view of every policy and rule known to a run.
///
/// Policies and rules are held sorted by id so `policies()`/`rules()`
/// iterate deterministically.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: BTreeMap<String, Policy>,
    rules: BTreeMap<String, Rule>,
    source_paths: BTreeMap<String, PathBuf>,
}

impl PolicyRegistry {
    /// Loads every policy document under `root`, normalizing both accepted
    /// shapes. Fatal errors (duplicate ids, a blocking rule without
    /// `severity=error`) abort the load; unparseable documents are
    /// collected as warnings and skipped.
    pub fn load(root: &Path) -> Result<(PolicyRegistry, Vec<PolicyError>), PolicyError> {
        let paths = discover_documents(root)?;
        let mut registry = PolicyRegistry::default();
        let mut warnings = Vec::new();
        let mut fatal = Vec::new();

        for path in paths {
            let value = match parse_document(&path) {
                Ok(v) => v,
                Err(e) => {
                    warnings.push(e);
                    continue;
                }
            };
            let normalized = normalize(&value, &path);

            if let Some(existing_path) = registry.source_paths.get(&normalized.policy.policy_id) {
                fatal.push(PolicyError::DuplicatePolicy {
                    policy_id: normalized.policy.policy_id.clone(),
                    first_path: existing_path.display().to_string(),
                    second_path: path.display().to_string(),
                });
                continue;
            }

            for rule in &normalized.rules {
                if rule.enforcement == Enforcement::Blocking && rule.severity != Severity::Error {
                    fatal.push(PolicyError::InvalidEnforcementSeverityCombo {
                        rule_id: rule.rule_id.clone(),
                        severity: rule.severity.to_string(),
                    });
                }
                if let Some(existing) = registry.rules.get(&rule.rule_id) {
                    fatal.push(PolicyError::DuplicateRule {
                        rule_id: rule.rule_id.clone(),
                        first_policy: existing.policy_id.clone(),
                        second_policy: rule.policy_id.clone(),
                    });
                    continue;
                }
                let _ = registry.rules.insert(rule.rule_id.clone(), rule.clone());
            }

            let _ = registry
                .source_paths
                .insert(normalized.policy.policy_id.clone(), path);
            let _ = registry
                .policies
                .insert(normalized.policy.policy_id.clone(), normalized.policy);
        }

        handle_errors(fatal)?;
        Ok((registry, warnings))
    }

    /// Iterates policies, sorted by `policy_id`.
    pub fn policies(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values()
    }

    /// Iterates rules, sorted by `rule_id`.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    /// Looks up a rule by id.
    #[must_use]
    pub fn get_rule(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.get(rule_id)
    }

    /// Looks up a policy by id.
    #[must_use]
    pub fn get_policy(&self, policy_id: &str) -> Option<&Policy> {
        self.policies.get(policy_id)
    }

    /// Number of rules loaded.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Resolves a caller-provided short name to the backing document path,
    /// trying in order: (a) direct filename match, (b) the name as a bare
    /// `policy_id`, (c) a recursive file-stem match.
    pub fn resolve_policy(&self, name_or_path: &str) -> Result<PathBuf, FileNotFoundError> {
        for path in self.source_paths.values() {
            if path
                .file_name()
                .and_then(|f| f.to_str())
                .is_some_and(|f| f == name_or_path)
            {
                return Ok(path.clone());
            }
        }
        if let Some(path) = self.source_paths.get(name_or_path) {
            return Ok(path.clone());
        }
        for path in self.source_paths.values() {
            if path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s == name_or_path)
            {
                return Ok(path.clone());
            }
        }
        Err(FileNotFoundError {
            name: name_or_path.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_flat_and_nested_documents_from_a_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("demo.json"),
            r#"{"id": "demo", "rules": [
                {"id": "demo.rule_one", "statement": "x", "severity": "error", "enforcement": "blocking"}
            ]}"#,
        )
        .expect("write");
        fs::write(
            dir.path().join("nested.yaml"),
            "id: nested\nagent_rules:\n  - id: agent.rule_two\n    statement: y\n    severity: warning\n",
        )
        .expect("write");

        let (registry, warnings) = PolicyRegistry::load(dir.path()).expect("load");
        assert!(warnings.is_empty());
        assert_eq!(registry.rule_count(), 2);
        assert!(registry.get_rule("demo.rule_one").is_some());
        assert!(registry.get_rule("agent.rule_two").is_some());
    }

    #[test]
    fn duplicate_rule_id_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("a.json"),
            r#"{"id": "a", "rules": [{"id": "dup.rule", "statement": "x", "severity": "info"}]}"#,
        )
        .expect("write");
        fs::write(
            dir.path().join("b.json"),
            r#"{"id": "b", "rules": [{"id": "dup.rule", "statement": "y", "severity": "info"}]}"#,
        )
        .expect("write");

        let result = PolicyRegistry::load(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn blocking_without_error_severity_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("a.json"),
            r#"{"id": "a", "rules": [
                {"id": "bad.rule", "statement": "x", "severity": "warning", "enforcement": "blocking"}
            ]}"#,
        )
        .expect("write");

        let result = PolicyRegistry::load(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn unparseable_document_is_a_warning_not_a_fatal_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("broken.json"), "{ not json").expect("write");
        fs::write(
            dir.path().join("good.json"),
            r#"{"id": "good", "rules": [{"id": "good.rule", "statement": "x", "severity": "info"}]}"#,
        )
        .expect("write");

        let (registry, warnings) = PolicyRegistry::load(dir.path()).expect("load");
        assert_eq!(warnings.len(), 1);
        assert_eq!(registry.rule_count(), 1);
    }

    #[test]
    fn resolve_policy_matches_by_filename_then_stem() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("demo.json"), r#"{"id": "demo"}"#).expect("write");
        let (registry, _) = PolicyRegistry::load(dir.path()).expect("load");

        assert!(registry.resolve_policy("demo.json").is_ok());
        assert!(registry.resolve_policy("demo").is_ok());
        assert!(registry.resolve_policy("nonexistent").is_err());
    }
}
