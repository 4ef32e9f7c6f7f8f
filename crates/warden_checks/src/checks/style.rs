// SPDX-License-Identifier: Apache-2.0

//! Naming / header / docstring checks: `File`-scoped checks that scan one
//! source file's text and emit one finding per offending symbol.
//!
//! Unlike `AtomicActionCheck`/`HeadlessBodyCheck`, these are not bound to a
//! fixed rule id at compile time: a policy document binds a rule to this
//! engine by name (`engine: DocstringCheck`), and [`DocstringCheck::bind`]
//! builds one instance per such binding found in a loaded registry.

use warden_common::severity::Severity;
use warden_policy::PolicyRegistry;

use crate::check::{RuleCheck, Target, TargetScope};
use crate::checks::python_scan::scan_functions;
use crate::context::AuditContext;
use crate::finding::Finding;

const ENGINE_NAME: &str = "DocstringCheck";

/// Flags `def`/`async def` functions with no docstring as the first
/// statement in their body.
pub struct DocstringCheck {
    rule_id: String,
    severity: Severity,
}

impl DocstringCheck {
    #[must_use]
    pub fn new(rule_id: String, severity: Severity) -> Self {
        DocstringCheck { rule_id, severity }
    }

    /// Builds one `DocstringCheck` per rule in `registry` bound to the
    /// `DocstringCheck` engine, taking the severity each rule declares.
    #[must_use]
    pub fn bind(registry: &PolicyRegistry) -> Vec<Box<dyn RuleCheck>> {
        registry
            .rules()
            .filter(|rule| {
                rule.engine
                    .as_ref()
                    .is_some_and(|binding| binding.engine == ENGINE_NAME)
            })
            .map(|rule| {
                Box::new(DocstringCheck::new(rule.rule_id.clone(), rule.severity)) as Box<dyn RuleCheck>
            })
            .collect()
    }
}

impl RuleCheck for DocstringCheck {
    fn rule_ids(&self) -> &[String] {
        std::slice::from_ref(&self.rule_id)
    }

    fn category(&self) -> &str {
        "docstring"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::File
    }

    fn verify(&self, context: &AuditContext, target: &Target) -> Vec<Finding> {
        let Target::File(relative_path) = target else {
            return Vec::new();
        };
        if !relative_path.ends_with(".py") {
            return Vec::new();
        }
        let Ok(source) = std::fs::read_to_string(context.repo_path.join(relative_path)) else {
            return Vec::new();
        };

        scan_functions(&source)
            .into_iter()
            .filter(|function| !function.has_docstring)
            .map(|function| {
                Finding::new(
                    &self.rule_id,
                    self.severity,
                    format!("function '{}' has no docstring", function.name),
                )
                .with_file(relative_path.clone())
                .with_line(function.line)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_functions_without_docstrings() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("a.py"),
            "def f():\n    pass\n",
        )
        .expect("write");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));
        let check = DocstringCheck::new("demo.must_have_docstring".to_owned(), Severity::Error);
        let findings = check.verify(&context, &Target::File("a.py".to_owned()));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].check_id, "demo.must_have_docstring");
        assert_eq!(findings[0].file_path.as_deref(), Some("a.py"));
        assert_eq!(findings[0].line, Some(1));
    }

    #[test]
    fn documented_function_yields_no_findings() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("a.py"),
            "def f():\n    \"\"\"doc\"\"\"\n    pass\n",
        )
        .expect("write");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));
        let check = DocstringCheck::new("demo.must_have_docstring".to_owned(), Severity::Error);
        let findings = check.verify(&context, &Target::File("a.py".to_owned()));
        assert!(findings.is_empty());
    }

    #[test]
    fn non_python_targets_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));
        let check = DocstringCheck::new("demo.must_have_docstring".to_owned(), Severity::Error);
        let findings = check.verify(&context, &Target::File("a.rs".to_owned()));
        assert!(findings.is_empty());
    }
}
