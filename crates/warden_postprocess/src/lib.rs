// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

pub mod config;
pub mod verdict;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use warden_checks::Finding;
use warden_common::severity::Severity;
use warden_policy::PolicyRegistry;

pub use config::{DowngradeRule, IgnoreRule, PostprocessConfig};
pub use verdict::{derive_verdict, Verdict};

/// A finding moved to the ignored bucket, with the rationale that exempted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnoredFinding {
    /// The finding that was exempted.
    pub finding: Finding,
    /// Why it was exempted.
    pub reason: String,
}

/// The full output of the postprocessing pipeline.
#[derive(Debug, Clone)]
pub struct PostprocessResult {
    /// Surviving findings, deduplicated and sorted.
    pub findings: Vec<Finding>,
    /// Findings removed by an auto-ignore rule.
    pub ignored: Vec<IgnoredFinding>,
    /// The derived verdict over `findings`.
    pub verdict: Verdict,
}

/// Runs the full postprocessing pipeline: entry-point downgrade,
/// auto-ignore, dedup, stable sort, then verdict derivation.
///
/// `entry_point_files` is the set of repository-relative file paths the
/// caller has identified as entry points (from the knowledge graph or
/// elsewhere); a finding whose `file_path` is in this set is eligible for
/// downgrade under a matching [`DowngradeRule`].
///
/// This function is pure and idempotent: feeding its own `findings` output
/// back in (with no ignore rules left to apply, since those findings
/// already left the set) reproduces the same `findings` and `verdict`.
#[must_use]
pub fn postprocess(
    findings: Vec<Finding>,
    registry: &PolicyRegistry,
    entry_point_files: &HashSet<String>,
    config: &PostprocessConfig,
) -> PostprocessResult {
    let downgraded = downgrade_entry_points(findings, entry_point_files, config);
    let (kept, ignored) = auto_ignore(downgraded, config);
    let deduped = dedup(kept);
    let mut sorted = deduped;
    stable_sort(&mut sorted);
    let verdict = derive_verdict(&sorted, registry);

    PostprocessResult { findings: sorted, ignored, verdict }
}

fn downgrade_entry_points(
    findings: Vec<Finding>,
    entry_point_files: &HashSet<String>,
    config: &PostprocessConfig,
) -> Vec<Finding> {
    let downgradable: HashSet<&str> = config.downgrade_rules.iter().map(|r| r.rule_id.as_str()).collect();

    findings
        .into_iter()
        .map(|mut finding| {
            let is_entry_point = finding.file_path.as_deref().is_some_and(|p| entry_point_files.contains(p));
            if finding.severity == Severity::Error && is_entry_point && downgradable.contains(finding.check_id.as_str()) {
                finding.severity = Severity::Warning;
            }
            finding
        })
        .collect()
}

fn auto_ignore(findings: Vec<Finding>, config: &PostprocessConfig) -> (Vec<Finding>, Vec<IgnoredFinding>) {
    let mut kept = Vec::new();
    let mut ignored = Vec::new();

    for finding in findings {
        match config.ignore_rules.iter().find(|rule| rule.rule_id == finding.check_id) {
            Some(rule) => ignored.push(IgnoredFinding { finding, reason: rule.reason.clone() }),
            None => kept.push(finding),
        }
    }

    (kept, ignored)
}

fn dedup(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::with_capacity(findings.len());
    for finding in findings {
        let key = (finding.check_id.clone(), finding.file_path.clone(), finding.line, finding.message.clone());
        if seen.insert(key) {
            deduped.push(finding);
        }
    }
    deduped
}

fn stable_sort(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.check_id.cmp(&b.check_id))
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.line.cmp(&b.line))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(rule_id: &str, severity: Severity, enforcement: warden_common::severity::Enforcement) -> PolicyRegistry {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = format!(
            "{{\"id\": \"p\", \"title\": \"p\", \"version\": \"1\", \"authority\": \"policy\", \"rules\": [{{\"id\": \"{rule_id}\", \"statement\": \"s\", \"severity\": \"{sev}\", \"enforcement\": \"{enf}\"}}]}}",
            sev = match severity { Severity::Error => "error", Severity::Warning => "warning", Severity::Info => "info" },
            enf = match enforcement {
                warden_common::severity::Enforcement::Blocking => "blocking",
                warden_common::severity::Enforcement::Reporting => "reporting",
                warden_common::severity::Enforcement::Advisory => "advisory",
            },
        );
        std::fs::write(dir.path().join("p.json"), doc).expect("write");
        let (registry, warnings) = PolicyRegistry::load(dir.path()).expect("load");
        assert!(warnings.is_empty());
        registry
    }

    #[test]
    fn dedup_keeps_first_occurrence_only() {
        let registry = registry_with("r.a", Severity::Error, warden_common::severity::Enforcement::Blocking);
        let finding = Finding::new("r.a", Severity::Error, "boom").with_file("a.py").with_line(1);
        let result = postprocess(vec![finding.clone(), finding], &registry, &HashSet::new(), &PostprocessConfig::default());
        assert_eq!(result.findings.len(), 1);
    }

    #[test]
    fn entry_point_downgrade_moves_error_to_warning() {
        let registry = registry_with("style.unused_function", Severity::Error, warden_common::severity::Enforcement::Blocking);
        let finding = Finding::new("style.unused_function", Severity::Error, "unused").with_file("cli/main.py").with_line(1);
        let mut entry_points = HashSet::new();
        entry_points.insert("cli/main.py".to_owned());
        let config = PostprocessConfig {
            downgrade_rules: vec![DowngradeRule { rule_id: "style.unused_function".to_owned() }],
            ignore_rules: Vec::new(),
        };
        let result = postprocess(vec![finding], &registry, &entry_points, &config);
        assert_eq!(result.findings[0].severity, Severity::Warning);
        assert_eq!(result.verdict, Verdict::PassWithWarnings);
    }

    #[test]
    fn auto_ignore_moves_finding_to_ignored_bucket_and_passes() {
        let registry = registry_with("style.unused_function", Severity::Error, warden_common::severity::Enforcement::Blocking);
        let finding = Finding::new("style.unused_function", Severity::Error, "unused").with_file("cli/main.py").with_line(1);
        let config = PostprocessConfig {
            downgrade_rules: Vec::new(),
            ignore_rules: vec![IgnoreRule { rule_id: "style.unused_function".to_owned(), reason: "entry points are exempt".to_owned() }],
        };
        let result = postprocess(vec![finding], &registry, &HashSet::new(), &config);
        assert!(result.findings.is_empty());
        assert_eq!(result.ignored.len(), 1);
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn applying_postprocess_twice_is_idempotent() {
        let registry = registry_with("r.a", Severity::Error, warden_common::severity::Enforcement::Blocking);
        let finding = Finding::new("r.a", Severity::Error, "boom").with_file("a.py").with_line(1);
        let once = postprocess(vec![finding], &registry, &HashSet::new(), &PostprocessConfig::default());
        let twice = postprocess(once.findings.clone(), &registry, &HashSet::new(), &PostprocessConfig::default());
        assert_eq!(once.findings, twice.findings);
        assert_eq!(once.verdict, twice.verdict);
    }
}
