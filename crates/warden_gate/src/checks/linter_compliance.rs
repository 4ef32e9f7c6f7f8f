// SPDX-License-Identifier: Apache-2.0

//! `linter_compliance`: linter and formatter both report clean, each run
//! as its own time-bounded subprocess.

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use warden_common::subprocess::{run_with_deadline, Semaphore, SubprocessOutcome};

use crate::check::{WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "linter_compliance";
const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// Runs a linter and a formatter, each in check-only mode, against the
/// target repository.
pub struct LinterComplianceCheck {
    linter_command: String,
    linter_args: Vec<String>,
    formatter_command: String,
    formatter_args: Vec<String>,
    deadline: Duration,
    semaphore: Arc<Semaphore>,
}

impl LinterComplianceCheck {
    /// Builds a check that shares `semaphore` with the gate's other
    /// subprocess-spawning checks.
    #[must_use]
    pub fn new(semaphore: Arc<Semaphore>) -> Self {
        LinterComplianceCheck {
            linter_command: "ruff".to_owned(),
            linter_args: vec!["check".to_owned()],
            formatter_command: "black".to_owned(),
            formatter_args: vec!["--check".to_owned()],
            deadline: DEFAULT_DEADLINE,
            semaphore,
        }
    }

    fn run_one(&self, command: &str, args: &[String], target: &str, label: &str) -> Vec<String> {
        let mut cmd = Command::new(command);
        let _ = cmd.args(args).arg(target);

        let _permit = self.semaphore.acquire();
        match run_with_deadline(cmd, self.deadline) {
            SubprocessOutcome::Completed { success: true, .. } => Vec::new(),
            SubprocessOutcome::Completed { success: false, output } => {
                if output.trim().is_empty() {
                    vec![format!("{label} reported a non-zero exit with no output")]
                } else {
                    output.lines().filter(|l| !l.trim().is_empty()).map(str::to_owned).collect()
                }
            }
            SubprocessOutcome::TimedOut => vec![format!("{label} timed out after {}s", self.deadline.as_secs())],
            SubprocessOutcome::SpawnFailed(error) => vec![format!("could not run {label} '{command}': {error}")],
        }
    }
}

impl WorkflowCheck for LinterComplianceCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, params: &WorkflowCheckParams) -> Vec<String> {
        let target = params.repo_path.as_deref().map_or_else(|| "src".to_owned(), |p| format!("{p}/src"));

        let mut violations = self.run_one(&self.linter_command, &self.linter_args, &target, "linter");
        violations.extend(self.run_one(&self.formatter_command, &self.formatter_args, &target, "formatter"));
        violations
    }
}
