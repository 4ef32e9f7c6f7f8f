// SPDX-License-Identifier: Apache-2.0

//! Import Resolution: runs a configured linter selecting undefined-name and
//! unused-import classes against the source tree.

use std::process::Command;
use std::time::Duration;

use warden_common::severity::Severity;
use warden_common::subprocess::{run_with_deadline, SubprocessOutcome};

use crate::check::{RuleCheck, Target, TargetScope};
use crate::context::AuditContext;
use crate::finding::Finding;

const RULE_ID: &str = "core.imports.must_resolve";
const MAX_SURFACED_VIOLATIONS: usize = 20;
const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Runs a configured linter's undefined-name/unused-import rules against
/// `src/` and surfaces the first 20 violations plus the total count.
pub struct ImportResolutionCheck {
    rule_ids: Vec<String>,
    linter_command: String,
    linter_args: Vec<String>,
    deadline: Duration,
}

impl Default for ImportResolutionCheck {
    fn default() -> Self {
        ImportResolutionCheck {
            rule_ids: vec![RULE_ID.to_owned()],
            linter_command: "ruff".to_owned(),
            linter_args: vec!["check".to_owned(), "--select".to_owned(), "F821,F401".to_owned()],
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl RuleCheck for ImportResolutionCheck {
    fn rule_ids(&self) -> &[String] {
        &self.rule_ids
    }

    fn category(&self) -> &str {
        "import_resolution"
    }

    fn target_scope(&self) -> TargetScope {
        TargetScope::Global
    }

    fn verify(&self, context: &AuditContext, _target: &Target) -> Vec<Finding> {
        let src = context.path_resolver.resolve("src");
        let mut command = Command::new(&self.linter_command);
        let _ = command.args(&self.linter_args).arg(&src);

        match run_with_deadline(command, self.deadline) {
            SubprocessOutcome::Completed { success: true, .. } => Vec::new(),
            SubprocessOutcome::Completed { success: false, output } => {
                let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
                let surfaced = lines.iter().take(MAX_SURFACED_VIOLATIONS).copied().collect::<Vec<_>>().join("\n");
                vec![Finding::new(
                    RULE_ID,
                    Severity::Error,
                    format!("{} import-resolution violation(s) found", lines.len()),
                )
                .with_context(surfaced)]
            }
            SubprocessOutcome::TimedOut => vec![Finding::new(
                RULE_ID,
                Severity::Error,
                format!("import-resolution linter timed out after {}s", self.deadline.as_secs()),
            )],
            SubprocessOutcome::SpawnFailed(error) => vec![Finding::new(
                RULE_ID,
                Severity::Error,
                format!("could not run linter '{}': {error}", self.linter_command),
            )],
        }
    }
}
