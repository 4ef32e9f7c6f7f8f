// SPDX-License-Identifier: Apache-2.0

//! The read-only carrier every check receives: repository paths, the
//! lazily-loaded knowledge graph, and (for the workflow-gate checks only) an
//! action ledger session.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use warden_kg::{EmptyKnowledgeGraphSource, KnowledgeGraph, KnowledgeGraphSource};

/// Centralizes all logical-name to absolute-path translation so checks
/// never build paths from string concatenation against the repo root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    repo_path: PathBuf,
}

impl PathResolver {
    /// Creates a resolver rooted at `repo_path`.
    #[must_use]
    pub fn new(repo_path: PathBuf) -> Self {
        PathResolver { repo_path }
    }

    /// Translates a repository-relative logical name to an absolute path.
    #[must_use]
    pub fn resolve(&self, logical_name: &str) -> PathBuf {
        self.repo_path.join(logical_name)
    }

    /// Translates an absolute path back to a repository-relative one, if it
    /// is under the repository root.
    #[must_use]
    pub fn repo_relative<'a>(&self, absolute: &'a Path) -> Option<&'a Path> {
        absolute.strip_prefix(&self.repo_path).ok()
    }

    /// The repository root this resolver is anchored to.
    #[must_use]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

/// One recorded outcome from the external action ledger (the out-of-scope
/// relational DB/ORM collaborator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Whether the recorded action succeeded.
    pub ok: bool,
    /// When the action was recorded.
    pub timestamp: SystemTime,
    /// Free-form detail (e.g. a linter's summary line).
    pub detail: Option<String>,
}

/// The narrow interface standing in for the relational DB/ORM that backs
/// alignment, test, and audit-history workflow-gate checks. A session is
/// acquired per operation and never held across a suspension point.
pub trait ActionLedger: Send + Sync {
    /// Most recent alignment-verification action recorded for `file_path`.
    fn latest_alignment_action(&self, file_path: &str) -> Option<ActionRecord>;

    /// Most recent test-run action recorded, for any file.
    fn latest_test_action(&self) -> Option<ActionRecord>;

    /// Number of failed audits recorded since `since`.
    fn audit_failures_since(&self, since: SystemTime) -> usize;
}

/// Read-only carrier injected into every check: repository paths, the
/// knowledge-graph accessor, and (when present) an action-ledger session.
///
/// Carries no mutable state except the knowledge graph's internal
/// single-flight load cache.
pub struct AuditContext {
    /// Root of the audited source repository.
    pub repo_path: PathBuf,
    /// Root of the constitutional/policy tree.
    pub intent_root: PathBuf,
    /// Logical-name to path translator.
    pub path_resolver: PathResolver,
    /// Lazily-loaded mirror of the symbol graph.
    pub knowledge_graph: KnowledgeGraph,
    /// Action-ledger session, present only when a DB-backed check needs one.
    pub db_session: Option<Arc<dyn ActionLedger>>,
}

impl AuditContext {
    /// Builds a context with no knowledge-graph source and no DB session
    /// wired up, suitable for checks that need neither.
    #[must_use]
    pub fn new(repo_path: PathBuf, intent_root: PathBuf) -> Self {
        AuditContext {
            path_resolver: PathResolver::new(repo_path.clone()),
            repo_path,
            intent_root,
            knowledge_graph: KnowledgeGraph::new(Arc::new(EmptyKnowledgeGraphSource)),
            db_session: None,
        }
    }

    /// Builds a context with a real knowledge-graph source wired up.
    #[must_use]
    pub fn with_knowledge_graph_source(
        repo_path: PathBuf,
        intent_root: PathBuf,
        source: Arc<dyn KnowledgeGraphSource>,
    ) -> Self {
        AuditContext {
            path_resolver: PathResolver::new(repo_path.clone()),
            repo_path,
            intent_root,
            knowledge_graph: KnowledgeGraph::new(source),
            db_session: None,
        }
    }

    /// Returns a copy of this context with a DB session attached.
    #[must_use]
    pub fn with_db_session(mut self, session: Arc<dyn ActionLedger>) -> Self {
        self.db_session = Some(session);
        self
    }
}
