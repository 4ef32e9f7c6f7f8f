// SPDX-License-Identifier: Apache-2.0

//! The `RuleCheck` task interface and the target a given invocation covers.

use crate::context::AuditContext;
use crate::finding::Finding;

/// How often a check is invoked per audit run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetScope {
    /// Once per discovered source file.
    File,
    /// Once per well-known subtree (e.g. the actions module tree).
    Tree,
    /// Once per run.
    Global,
}

/// One unit of work handed to a check: a file, a named subtree, or the
/// whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single discovered source file, repository-relative.
    File(String),
    /// A well-known subtree, identified by name (e.g. `"actions"`, `"body"`).
    Tree(String),
    /// The whole run; carries no identifying data.
    Global,
}

/// A concrete verifier bound to one or more rule ids.
///
/// A check is pure with respect to observation: it must not mutate the
/// repository, the DB, or the finding set outside its return value, and it
/// must be deterministic given the same context and target.
pub trait RuleCheck: Send + Sync {
    /// The rule ids this check enforces; every finding it emits must carry
    /// one of these as `check_id`.
    fn rule_ids(&self) -> &[String];

    /// Free-form grouping label, e.g. `"imports"`, `"naming"`.
    fn category(&self) -> &str;

    /// How often the auditor invokes this check.
    fn target_scope(&self) -> TargetScope;

    /// For `TargetScope::Tree` checks, the names of the subtrees the
    /// auditor should invoke this check against (e.g. `["actions"]`).
    /// Ignored for `File`/`Global` scope.
    fn tree_targets(&self) -> Vec<String> {
        Vec::new()
    }

    /// Runs the check against one target, returning zero or more findings.
    fn verify(&self, context: &AuditContext, target: &Target) -> Vec<Finding>;
}
