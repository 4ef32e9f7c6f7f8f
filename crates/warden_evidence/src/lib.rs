// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

mod markdown;

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Serialize;
use warden_audit::AuditResult;
use warden_coverage::CoverageMap;

/// Failure modes writing an evidence artifact can hit. Every variant is an
/// I/O failure against the reports directory; there is no "partial write"
/// variant because `write_atomic` never leaves one.
#[derive(thiserror::Error, Debug, Diagnostic, Clone)]
pub enum EvidenceError {
    /// The artifact's destination path could not be written.
    #[error("could not write evidence artifact '{path}': {error}")]
    Io {
        /// The artifact path that failed.
        path: String,
        /// The underlying I/O error, rendered.
        error: String,
    },
}

fn io_error(path: &Path, error: std::io::Error) -> EvidenceError {
    EvidenceError::Io { path: path.display().to_string(), error: error.to_string() }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), EvidenceError> {
    let contents = serde_json::to_vec_pretty(value).expect("evidence artifacts always serialize");
    warden_common::atomic_write::write_atomic(path, &contents).map_err(|e| io_error(path, e))
}

fn write_text(path: &Path, contents: &str) -> Result<(), EvidenceError> {
    warden_common::atomic_write::write_atomic(path, contents.as_bytes()).map_err(|e| io_error(path, e))
}

/// The canonical audit ledger entry written to
/// `reports/audit/latest_audit.json`: a compact summary rather than the
/// full findings list (that lives in `audit_findings.json`).
#[derive(Debug, Clone, Serialize)]
struct AuditLedgerEntry<'a> {
    audit_id: String,
    timestamp: String,
    passed: bool,
    verdict: warden_postprocess::Verdict,
    findings_count: usize,
    executed_rules: Vec<&'a str>,
    stats: warden_audit::AuditStats,
}

impl<'a> AuditLedgerEntry<'a> {
    fn from_result(audit_result: &'a AuditResult) -> Self {
        AuditLedgerEntry {
            audit_id: audit_result.audit_id.to_string(),
            timestamp: audit_result.timestamp.to_rfc3339(),
            passed: audit_result.passed(),
            verdict: audit_result.verdict,
            findings_count: audit_result.findings.len(),
            executed_rules: audit_result.executed_rule_ids.iter().map(String::as_str).collect(),
            stats: audit_result.stats,
        }
    }
}

fn audit_dir(reports_dir: &Path) -> PathBuf {
    reports_dir.join("audit")
}

fn governance_dir(reports_dir: &Path) -> PathBuf {
    reports_dir.join("governance")
}

/// The on-disk shape of `audit_auto_ignored.json`: a generation timestamp
/// alongside the ignored items, so a reader can tell a stale artifact from
/// "nothing was ignored this run".
#[derive(Debug, Clone, Serialize)]
struct AutoIgnoredArtifact<'a> {
    generated_at: String,
    items: &'a [warden_postprocess::IgnoredFinding],
}

/// Persists one auditor run: the ledger entry, the full findings list, and
/// the auto-ignored findings (both JSON and Markdown).
///
/// Returns the ledger entry's path (`reports/audit/latest_audit.json`), the
/// stable handle most callers want to log after a run.
pub fn write_audit_result(reports_dir: &Path, audit_result: &AuditResult) -> Result<PathBuf, EvidenceError> {
    let ledger_path = audit_dir(reports_dir).join("latest_audit.json");
    write_json(&ledger_path, &AuditLedgerEntry::from_result(audit_result))?;

    let findings_path = reports_dir.join("audit_findings.json");
    write_json(&findings_path, &audit_result.findings)?;

    let ignored_json_path = reports_dir.join("audit_auto_ignored.json");
    let ignored_artifact = AutoIgnoredArtifact {
        generated_at: chrono::Utc::now().to_rfc3339(),
        items: &audit_result.ignored,
    };
    write_json(&ignored_json_path, &ignored_artifact)?;

    let ignored_md_path = reports_dir.join("audit_auto_ignored.md");
    write_text(&ignored_md_path, &markdown::render_ignored(&audit_result.ignored))?;

    Ok(ledger_path)
}

/// Persists a coverage map (both JSON and Markdown) under
/// `reports/governance/enforcement_coverage_map.{json,md}`.
///
/// Returns the JSON artifact's path.
pub fn write_coverage_map(reports_dir: &Path, coverage_map: &CoverageMap) -> Result<PathBuf, EvidenceError> {
    let json_path = governance_dir(reports_dir).join("enforcement_coverage_map.json");
    write_json(&json_path, coverage_map)?;

    let md_path = governance_dir(reports_dir).join("enforcement_coverage_map.md");
    write_text(&md_path, &markdown::render_coverage(coverage_map))?;

    Ok(json_path)
}
