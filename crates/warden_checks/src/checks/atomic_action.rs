// SPDX-License-Identifier: Apache-2.0

//! Atomic-Action Contract: every async function under the actions subtree
//! must (a) carry an `@atomic_action` decorator with the required fields,
//! (b) declare a return type that encodes the `ActionResult` sentinel, and
//! (c) have every `return` emit `ActionResult(action_id=..., ok=...,
//! data={...})` with `data` as a dict literal.

use warden_common::severity::Severity;

use crate::check::{RuleCheck, Target, TargetScope};
use crate::checks::python_scan::{discover_python_files, scan_functions};
use crate::context::AuditContext;
use crate::finding::Finding;

const RULE_ID: &str = "core.actions.atomic_action_contract";
const REQUIRED_DECORATOR_FIELDS: &[&str] = &["action_id", "intent", "impact", "policies"];
/// The structured result sentinel every atomic action must declare and
/// return, per spec.md §4.10(b)/(c).
const RESULT_SENTINEL_TYPE: &str = "ActionResult";

/// Enforces the atomic-action contract over the `actions` subtree.
pub struct AtomicActionCheck {
    rule_ids: Vec<String>,
}

impl Default for AtomicActionCheck {
    fn default() -> Self {
        AtomicActionCheck {
            rule_ids: vec![RULE_ID.to_owned()],
        }
    }
}

impl RuleCheck for AtomicActionCheck {
    fn rule_ids(&self) -> &[String] {
        &self.rule_ids
    }

    fn category(&self) -> &str {
        "atomic_action"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Tree
    }

    fn tree_targets(&self) -> Vec<String> {
        vec!["actions".to_owned()]
    }

    fn verify(&self, context: &AuditContext, target: &Target) -> Vec<Finding> {
        let Target::Tree(name) = target else {
            return Vec::new();
        };
        let root = context.path_resolver.resolve(name);
        let files = discover_python_files(&root);
        let mut findings = Vec::new();

        for file in files {
            let Ok(source) = std::fs::read_to_string(&file) else {
                findings.push(
                    Finding::new(RULE_ID, Severity::Error, "could not read file for atomic-action scan")
                        .with_file(display_path(context, &file)),
                );
                continue;
            };
            for function in scan_functions(&source) {
                if !function.is_async {
                    continue;
                }
                let rel = display_path(context, &file);

                let decorator = function
                    .decorators
                    .iter()
                    .find(|d| d.starts_with("atomic_action"));
                match decorator {
                    None => {
                        findings.push(
                            Finding::new(
                                RULE_ID,
                                Severity::Error,
                                format!("async function '{}' is missing @atomic_action", function.name),
                            )
                            .with_file(rel.clone())
                            .with_line(function.line)
                            .with_context("add @atomic_action(action_id=..., intent=..., impact=..., policies=[...])".to_owned()),
                        );
                    }
                    Some(decorator_text) => {
                        for field in REQUIRED_DECORATOR_FIELDS {
                            if !decorator_text.contains(field) {
                                findings.push(
                                    Finding::new(
                                        RULE_ID,
                                        Severity::Error,
                                        format!(
                                            "@atomic_action on '{}' is missing required field '{field}'",
                                            function.name
                                        ),
                                    )
                                    .with_file(rel.clone())
                                    .with_line(function.line)
                                    .with_context(format!("add {field}=... to the decorator")),
                                );
                            }
                        }
                    }
                }

                if !function
                    .return_annotation
                    .as_deref()
                    .is_some_and(|a| a.contains(RESULT_SENTINEL_TYPE))
                {
                    findings.push(
                        Finding::new(
                            RULE_ID,
                            Severity::Error,
                            format!(
                                "async function '{}' must declare a return type that encodes {RESULT_SENTINEL_TYPE}",
                                function.name
                            ),
                        )
                        .with_file(rel.clone())
                        .with_line(function.line)
                        .with_context(format!("annotate the signature `-> {RESULT_SENTINEL_TYPE}`")),
                    );
                }

                for (return_line, expr) in &function.returns {
                    if !return_is_compliant(expr) {
                        findings.push(
                            Finding::new(
                                RULE_ID,
                                Severity::Error,
                                format!(
                                    "return in '{}' must emit {RESULT_SENTINEL_TYPE}{{action_id, ok, data}} with data as a dict literal",
                                    function.name
                                ),
                            )
                            .with_file(rel.clone())
                            .with_line(*return_line)
                            .with_context(format!(
                                "return {RESULT_SENTINEL_TYPE}(action_id=..., ok=..., data={{...}})"
                            )),
                        );
                    }
                }
            }
        }
        findings
    }
}

/// True iff `expr` (the text after `return `) carries `action_id=` and
/// `ok=` fields plus a `data=` field whose value opens with a dict literal
/// (`{`), per spec.md §4.10(c).
fn return_is_compliant(expr: &str) -> bool {
    let has_action_id = expr.contains("action_id=");
    let has_ok = expr.contains("ok=");
    let data_is_dict_literal = expr
        .split("data=")
        .nth(1)
        .is_some_and(|after| after.trim_start().starts_with('{'));
    has_action_id && has_ok && data_is_dict_literal
}

fn display_path(context: &AuditContext, file: &std::path::Path) -> String {
    context
        .path_resolver
        .repo_relative(file)
        .unwrap_or(file)
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flags_missing_decorator_and_missing_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let actions = dir.path().join("actions");
        std::fs::create_dir_all(&actions).expect("mkdir");
        std::fs::write(
            actions.join("a.py"),
            "async def no_decorator():\n    pass\n\n@atomic_action(action_id=\"x\")\nasync def partial():\n    pass\n",
        )
        .expect("write");

        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));
        let check = AtomicActionCheck::default();
        let findings = check.verify(&context, &Target::Tree("actions".to_owned()));

        assert!(findings.iter().any(|f| f.message.contains("missing @atomic_action")));
        assert!(findings.iter().any(|f| f.message.contains("intent")));
    }

    #[test]
    fn compliant_function_yields_no_findings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let actions = dir.path().join("actions");
        std::fs::create_dir_all(&actions).expect("mkdir");
        std::fs::write(
            actions.join("a.py"),
            "@atomic_action(action_id=\"x\", intent=\"y\", impact=\"z\", policies=[\"p\"])\nasync def ok() -> ActionResult:\n    return ActionResult(action_id=\"x\", ok=True, data={})\n",
        )
        .expect("write");

        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));
        let check = AtomicActionCheck::default();
        let findings = check.verify(&context, &Target::Tree("actions".to_owned()));
        assert!(findings.is_empty());
    }

    #[test]
    fn flags_missing_return_annotation_and_non_dict_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let actions = dir.path().join("actions");
        std::fs::create_dir_all(&actions).expect("mkdir");
        std::fs::write(
            actions.join("a.py"),
            "@atomic_action(action_id=\"x\", intent=\"y\", impact=\"z\", policies=[\"p\"])\nasync def untyped():\n    return ActionResult(action_id=\"x\", ok=True, data=payload)\n",
        )
        .expect("write");

        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));
        let check = AtomicActionCheck::default();
        let findings = check.verify(&context, &Target::Tree("actions".to_owned()));

        assert!(findings.iter().any(|f| f.message.contains("must declare a return type")));
        assert!(findings.iter().any(|f| f.message.contains("dict literal")));
    }
}
