// SPDX-License-Identifier: Apache-2.0

//! The `WorkflowCheck` task interface and the parameter bag passed to it.

use std::collections::HashMap;

use serde_json::Value;

/// Read-only inputs a `WorkflowCheck` draws from: an optional target file
/// (required by file-scoped checks like `alignment_verification`) plus a
/// free-form bag of caller-supplied parameters (rolling-window sizes,
/// confidence thresholds, a canary boolean, etc).
#[derive(Debug, Clone, Default)]
pub struct WorkflowCheckParams {
    /// The file under evaluation, if the workflow operation targets one.
    pub file_path: Option<String>,
    /// Root of the repository the subprocess-backed checks scan.
    pub repo_path: Option<String>,
    /// Free-form named parameters, e.g. `{"canary_passed": true}`.
    values: HashMap<String, Value>,
}

impl WorkflowCheckParams {
    /// An empty parameter bag.
    #[must_use]
    pub fn new() -> Self {
        WorkflowCheckParams::default()
    }

    /// Sets the target file path (builder style).
    #[must_use]
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    /// Sets the repository root (builder style).
    #[must_use]
    pub fn with_repo_path(mut self, repo_path: impl Into<String>) -> Self {
        self.repo_path = Some(repo_path.into());
        self
    }

    /// Sets a named parameter (builder style).
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.values.insert(key.into(), value.into());
        self
    }

    /// Reads a named parameter as a string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Reads a named parameter as a bool.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Reads a named parameter as a float.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    /// Reads a named parameter as an unsigned integer.
    #[must_use]
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.values.get(key).and_then(Value::as_u64)
    }
}

/// A single admission probe a workflow gate runs.
///
/// A check never panics and never errors to its caller: any unreachable
/// collaborator, missing binary, or timeout becomes a violation string
/// instead, per the gate's "never throw" propagation policy.
pub trait WorkflowCheck: Send + Sync {
    /// The stable identifier external callers configure a gate with, e.g.
    /// `"linter_compliance"`.
    fn check_type(&self) -> &str;

    /// Runs the check, returning zero or more human-readable violations.
    fn verify(&self, params: &WorkflowCheckParams) -> Vec<String>;
}

/// The sentinel violation for a DB-backed check whose action ledger is
/// unreachable, per the documented error-handling contract.
#[must_use]
pub fn db_unavailable(subsystem: &str) -> String {
    format!("System Sensation Error: {subsystem} unreachable")
}
