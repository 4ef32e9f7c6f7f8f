// SPDX-License-Identifier: Apache-2.0

//! Headless-Body Contract: files under the body subtree (excluding the CLI
//! subtree) must not import UI/interactive modules, call `print`/`input`,
//! or read environment variables directly.

use warden_common::severity::Severity;

use crate::check::{RuleCheck, Target, TargetScope};
use crate::checks::python_scan::{calls_any, discover_python_files, env_reads, imports_any_prefix};
use crate::context::AuditContext;
use crate::finding::Finding;

const RULE_ID_INTERACTIVE: &str = "core.body.no_interactive_imports";
const RULE_ID_ENV_READS: &str = "core.body.no_env_reads";
const CLI_SUBTREE: &str = "cli";
const FORBIDDEN_IMPORT_PREFIXES: &[&str] = &["tkinter", "curses", "PyQt5", "rich", "textual"];

/// Enforces the headless-body contract over the `body` subtree.
pub struct HeadlessBodyCheck {
    rule_ids: Vec<String>,
}

impl Default for HeadlessBodyCheck {
    fn default() -> Self {
        HeadlessBodyCheck {
            rule_ids: vec![RULE_ID_INTERACTIVE.to_owned(), RULE_ID_ENV_READS.to_owned()],
        }
    }
}

impl RuleCheck for HeadlessBodyCheck {
    fn rule_ids(&self) -> &[String] {
        &self.rule_ids
    }

    fn category(&self) -> &str {
        "headless_body"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Tree
    }

    fn tree_targets(&self) -> Vec<String> {
        vec!["body".to_owned()]
    }

    fn verify(&self, context: &AuditContext, target: &Target) -> Vec<Finding> {
        let Target::Tree(name) = target else {
            return Vec::new();
        };
        let root = context.path_resolver.resolve(name);
        let mut findings = Vec::new();

        for file in discover_python_files(&root) {
            if file.components().any(|c| c.as_os_str() == CLI_SUBTREE) {
                continue;
            }
            let Ok(source) = std::fs::read_to_string(&file) else {
                continue;
            };
            let rel = context
                .path_resolver
                .repo_relative(&file)
                .unwrap_or(&file)
                .to_string_lossy()
                .into_owned();

            for (line, module) in imports_any_prefix(&source, FORBIDDEN_IMPORT_PREFIXES) {
                findings.push(
                    Finding::new(
                        RULE_ID_INTERACTIVE,
                        Severity::Error,
                        format!("body module imports interactive dependency '{module}'"),
                    )
                    .with_file(rel.clone())
                    .with_line(line),
                );
            }
            for (line, name) in calls_any(&source, &["print", "input"]) {
                findings.push(
                    Finding::new(
                        RULE_ID_INTERACTIVE,
                        Severity::Error,
                        format!("body module calls '{name}', which requires a terminal"),
                    )
                    .with_file(rel.clone())
                    .with_line(line),
                );
            }
            for line in env_reads(&source) {
                findings.push(
                    Finding::new(
                        RULE_ID_ENV_READS,
                        Severity::Warning,
                        "body module reads an environment variable directly",
                    )
                    .with_file(rel.clone())
                    .with_line(line),
                );
            }
        }
        findings
    }
}
