// SPDX-License-Identifier: Apache-2.0

//! `dead_code_check`: no dead code at or above a confidence threshold,
//! checked via a configurable static-analyzer subprocess.

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use warden_common::subprocess::{run_with_deadline, Semaphore, SubprocessOutcome};

use crate::check::{WorkflowCheck, WorkflowCheckParams};

const CHECK_TYPE: &str = "dead_code_check";
const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);
const DEFAULT_CONFIDENCE: u64 = 80;
const PARAM_CONFIDENCE: &str = "min_confidence";

/// Runs a configured dead-code static analyzer at a confidence threshold.
pub struct DeadCodeCheck {
    command: String,
    args: Vec<String>,
    deadline: Duration,
    semaphore: Arc<Semaphore>,
}

impl DeadCodeCheck {
    /// Builds a check that shares `semaphore` with the gate's other
    /// subprocess-spawning checks.
    #[must_use]
    pub fn new(semaphore: Arc<Semaphore>) -> Self {
        DeadCodeCheck {
            command: "vulture".to_owned(),
            args: Vec::new(),
            deadline: DEFAULT_DEADLINE,
            semaphore,
        }
    }
}

impl WorkflowCheck for DeadCodeCheck {
    fn check_type(&self) -> &str {
        CHECK_TYPE
    }

    fn verify(&self, params: &WorkflowCheckParams) -> Vec<String> {
        let confidence = params.get_u64(PARAM_CONFIDENCE).unwrap_or(DEFAULT_CONFIDENCE);
        let target = params.repo_path.as_deref().map_or_else(|| "src".to_owned(), |p| format!("{p}/src"));

        let mut command = Command::new(&self.command);
        let _ = command
            .args(&self.args)
            .arg("--min-confidence")
            .arg(confidence.to_string())
            .arg(&target);

        let _permit = self.semaphore.acquire();
        match run_with_deadline(command, self.deadline) {
            SubprocessOutcome::Completed { success: true, .. } => Vec::new(),
            SubprocessOutcome::Completed { success: false, output } => {
                output.lines().filter(|l| !l.trim().is_empty()).map(str::to_owned).collect()
            }
            SubprocessOutcome::TimedOut => vec![format!("dead-code scan timed out after {}s", self.deadline.as_secs())],
            SubprocessOutcome::SpawnFailed(error) => vec![format!("could not run dead-code analyzer '{}': {error}", self.command)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_analyzer_binary_is_one_violation_not_a_crash() {
        let mut check = DeadCodeCheck::new(Arc::new(Semaphore::new(1)));
        check.command = "definitely-not-a-real-analyzer-xyz".to_owned();
        let violations = check.verify(&WorkflowCheckParams::new());
        assert_eq!(violations.len(), 1);
    }
}
