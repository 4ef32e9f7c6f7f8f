// SPDX-License-Identifier: Apache-2.0

//! `import_resolution_check`: all imports resolve under `src/`, checked via
//! a configurable, time-bounded linter subprocess.

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use warden_common::subprocess::{run_with_deadline, Semaphore, SubprocessOutcome};

use crate::check::{WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "import_resolution_check";
const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Runs a configured linter's undefined-name/unused-import rules.
pub struct ImportResolutionCheck {
    command: String,
    args: Vec<String>,
    deadline: Duration,
    semaphore: Arc<Semaphore>,
}

impl ImportResolutionCheck {
    /// Builds a check that shares `semaphore` with the gate's other
    /// subprocess-spawning checks, bounding total concurrent children.
    #[must_use]
    pub fn new(semaphore: Arc<Semaphore>) -> Self {
        ImportResolutionCheck {
            command: "ruff".to_owned(),
            args: vec!["check".to_owned(), "--select".to_owned(), "F821,F401".to_owned()],
            deadline: DEFAULT_DEADLINE,
            semaphore,
        }
    }
}

impl WorkflowCheck for ImportResolutionCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, params: &WorkflowCheckParams) -> Vec<String> {
        let target = params.repo_path.as_deref().map_or_else(|| "src".to_owned(), |p| format!("{p}/src"));
        let mut command = Command::new(&self.command);
        let _ = command.args(&self.args).arg(&target);

        let _permit = self.semaphore.acquire();
        match run_with_deadline(command, self.deadline) {
            SubprocessOutcome::Completed { success: true, .. } => Vec::new(),
            SubprocessOutcome::Completed { success: false, output } => {
                output.lines().filter(|l| !l.trim().is_empty()).map(str::to_owned).collect()
            }
            SubprocessOutcome::TimedOut => vec![format!("import resolution timed out after {}s", self.deadline.as_secs())],
            SubprocessOutcome::SpawnFailed(error) => vec![format!("could not run linter '{}': {error}", self.command)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_linter_binary_is_one_violation_not_a_crash() {
        let mut check = ImportResolutionCheck::new(Arc::new(Semaphore::new(1)));
        check.command = "definitely-not-a-real-linter-xyz".to_owned();
        let violations = check.verify(&WorkflowCheckParams::new());
        assert_eq!(violations.len(), 1);
    }
}
