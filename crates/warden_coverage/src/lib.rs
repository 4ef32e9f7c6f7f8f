// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use warden_audit::AuditResult;
use warden_common::severity::Severity;
use warden_policy::{PolicyRegistry, Rule};

const GAP_SAMPLE_SIZE: usize = 10;

/// Where one rule falls in the coverage classification.
///
/// A filtered audit distinguishes `FilteredOut` (the engine exists and the
/// rule simply wasn't selected for this run) from `Implementable` (the
/// engine exists and the rule *was* in scope but still didn't run — a real
/// configuration gap), rather than reporting both the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// Has a bound engine and ran this audit.
    Enforced,
    /// Has a bound engine but did not run, and no filter explains why.
    Implementable,
    /// Has a bound engine but was excluded by a filtered audit's selection.
    FilteredOut,
    /// No engine bound at all.
    DeclaredOnly,
}

/// One rule's coverage classification.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CoverageEntry {
    /// The rule id.
    pub rule_id: String,
    /// The policy it was declared under.
    pub policy_id: String,
    /// Declared severity, used to prioritize gap samples.
    pub severity: Severity,
    /// The classification.
    pub status: CoverageStatus,
    /// True if the rule has a bound engine at all.
    pub has_engine: bool,
    /// True if the rule's id appears in the audit's `executed_rule_ids`.
    pub is_executed: bool,
}

/// Coverage counts and enforcement rate for one policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct PolicyAggregate {
    /// Rules classified `enforced`.
    pub enforced: usize,
    /// Rules classified `implementable`.
    pub implementable: usize,
    /// Rules classified `filtered_out`.
    pub filtered_out: usize,
    /// Rules classified `declared_only`.
    pub declared_only: usize,
    /// `enforced / total`, 0.0 when the policy declares no rules.
    pub enforcement_rate: f64,
}

impl PolicyAggregate {
    fn total(&self) -> usize {
        self.enforced + self.implementable + self.filtered_out + self.declared_only
    }
}

/// The full coverage reconciliation of a policy registry against one audit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CoverageMap {
    /// One entry per declared rule, sorted by rule id.
    pub entries: Vec<CoverageEntry>,
    /// Per-policy aggregate, keyed by `policy_id`, sorted.
    pub per_policy: std::collections::BTreeMap<String, PolicyAggregate>,
    /// The highest-severity `declared_only` rules, for remediation triage.
    pub gap_samples: Vec<CoverageEntry>,
    /// Rules with `severity=error`, a bound engine, and not executed.
    pub uncovered_error_rules: Vec<String>,
    /// Whether this map was computed against a filtered audit.
    pub is_filtered: bool,
}

impl CoverageMap {
    /// The coverage map's own pass/fail disposition: failing iff any
    /// error-severity rule with a bound engine did not run.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.uncovered_error_rules.is_empty()
    }
}

/// Reconciles `registry` against `audit_result`'s `executed_rule_ids`.
///
/// `is_filtered` selects between the two unexecuted-with-engine
/// classifications: pass `true` when `audit_result` came from
/// [`warden_audit::run_filtered_audit`], `false` for a full audit.
#[must_use]
pub fn coverage(registry: &PolicyRegistry, audit_result: &AuditResult, is_filtered: bool) -> CoverageMap {
    let mut entries: Vec<CoverageEntry> = registry
        .rules()
        .map(|rule| classify(rule, audit_result, is_filtered))
        .collect();
    entries.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));

    let per_policy = aggregate_per_policy(registry, &entries);

    let mut gap_samples: Vec<CoverageEntry> = entries
        .iter()
        .filter(|e| e.status == CoverageStatus::DeclaredOnly)
        .cloned()
        .collect();
    gap_samples.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.rule_id.cmp(&b.rule_id)));
    gap_samples.truncate(GAP_SAMPLE_SIZE);

    let uncovered_error_rules: Vec<String> = entries
        .iter()
        .filter(|e| e.severity == Severity::Error && e.has_engine && !e.is_executed)
        .map(|e| e.rule_id.clone())
        .collect();

    CoverageMap {
        entries,
        per_policy,
        gap_samples,
        uncovered_error_rules,
        is_filtered,
    }
}

fn classify(rule: &Rule, audit_result: &AuditResult, is_filtered: bool) -> CoverageEntry {
    let has_engine = rule.engine.is_some();
    let is_executed = audit_result.executed_rule_ids.contains(&rule.rule_id);

    let status = if !has_engine {
        CoverageStatus::DeclaredOnly
    } else if is_executed {
        CoverageStatus::Enforced
    } else if is_filtered {
        CoverageStatus::FilteredOut
    } else {
        CoverageStatus::Implementable
    };

    CoverageEntry {
        rule_id: rule.rule_id.clone(),
        policy_id: rule.policy_id.clone(),
        severity: rule.severity,
        status,
        has_engine,
        is_executed,
    }
}

fn aggregate_per_policy(
    registry: &PolicyRegistry,
    entries: &[CoverageEntry],
) -> std::collections::BTreeMap<String, PolicyAggregate> {
    let mut per_policy = std::collections::BTreeMap::new();
    for policy in registry.policies() {
        let _ = per_policy.insert(
            policy.policy_id.clone(),
            PolicyAggregate {
                enforced: 0,
                implementable: 0,
                filtered_out: 0,
                declared_only: 0,
                enforcement_rate: 0.0,
            },
        );
    }

    for entry in entries {
        let aggregate = per_policy.entry(entry.policy_id.clone()).or_insert(PolicyAggregate {
            enforced: 0,
            implementable: 0,
            filtered_out: 0,
            declared_only: 0,
            enforcement_rate: 0.0,
        });
        match entry.status {
            CoverageStatus::Enforced => aggregate.enforced += 1,
            CoverageStatus::Implementable => aggregate.implementable += 1,
            CoverageStatus::FilteredOut => aggregate.filtered_out += 1,
            CoverageStatus::DeclaredOnly => aggregate.declared_only += 1,
        }
    }

    for aggregate in per_policy.values_mut() {
        let total = aggregate.total();
        aggregate.enforcement_rate = if total == 0 {
            0.0
        } else {
            (aggregate.enforced as f64 / total as f64) * 100.0
        };
    }

    per_policy
}

/// True when `coverage_map_path` is missing or older than `evidence_path`,
/// i.e. the persisted coverage map needs regenerating. Mirrors derived-report
/// staleness checks elsewhere in the stack; unlike the integrity baseline
/// (which must hash file contents, never trust mtimes) this only guards
/// *regeneration of a report*, so mtime comparison is an acceptable shortcut.
#[must_use]
pub fn is_stale(coverage_map_path: &Path, evidence_path: &Path) -> bool {
    let map_modified = std::fs::metadata(coverage_map_path).and_then(|m| m.modified()).ok();
    let evidence_modified = std::fs::metadata(evidence_path).and_then(|m| m.modified()).ok();

    match (map_modified, evidence_modified) {
        (Some(map_time), Some(evidence_time)) => evidence_time > map_time,
        (None, _) => true,
        (Some(_), None) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use warden_audit::AuditStats;
    use warden_postprocess::Verdict;

    fn registry_from(doc: &str) -> PolicyRegistry {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("demo.json"), doc).expect("write");
        PolicyRegistry::load(dir.path()).expect("load").0
    }

    fn stub_result(executed: &[&str]) -> AuditResult {
        AuditResult {
            audit_id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            findings: Vec::new(),
            ignored: Vec::new(),
            executed_rule_ids: executed.iter().map(|s| (*s).to_owned()).collect::<BTreeSet<_>>(),
            stats: AuditStats {
                total_declared_rules: 0,
                total_executable_rules: 0,
                executed_dynamic_rules: 0,
                crashed_rules: 0,
                unmapped_rules: 0,
                coverage_percent: 0.0,
                effective_coverage_percent: 0.0,
            },
            verdict: Verdict::Pass,
        }
    }

    #[test]
    fn filtered_audit_classifies_per_scenario_s4() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "r.a", "statement": "x", "severity": "info", "engine": {"engine": "E"}},
                {"id": "r.b", "statement": "y", "severity": "info", "engine": {"engine": "E"}},
                {"id": "r.c", "statement": "z", "severity": "info"}
            ]}"#,
        );
        let audit_result = stub_result(&["r.a"]);
        let map = coverage(&registry, &audit_result, true);

        let by_id = |id: &str| map.entries.iter().find(|e| e.rule_id == id).expect("entry");
        assert_eq!(by_id("r.a").status, CoverageStatus::Enforced);
        assert_eq!(by_id("r.b").status, CoverageStatus::FilteredOut);
        assert_eq!(by_id("r.c").status, CoverageStatus::DeclaredOnly);
    }

    #[test]
    fn full_audit_unexecuted_engine_rule_is_implementable() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "r.a", "statement": "x", "severity": "info", "engine": {"engine": "E"}}
            ]}"#,
        );
        let audit_result = stub_result(&[]);
        let map = coverage(&registry, &audit_result, false);
        assert_eq!(map.entries[0].status, CoverageStatus::Implementable);
    }

    #[test]
    fn uncovered_error_rules_drives_pass_fail() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "r.a", "statement": "x", "severity": "error", "enforcement": "blocking", "engine": {"engine": "E"}}
            ]}"#,
        );
        let audit_result = stub_result(&[]);
        let map = coverage(&registry, &audit_result, false);
        assert_eq!(map.uncovered_error_rules, vec!["r.a".to_owned()]);
        assert!(!map.passed());
    }

    #[test]
    fn per_policy_enforcement_rate_is_computed() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "r.a", "statement": "x", "severity": "info", "engine": {"engine": "E"}},
                {"id": "r.b", "statement": "y", "severity": "info"}
            ]}"#,
        );
        let audit_result = stub_result(&["r.a"]);
        let map = coverage(&registry, &audit_result, false);
        let aggregate = map.per_policy.get("demo").expect("policy aggregate");
        assert_eq!(aggregate.enforced, 1);
        assert_eq!(aggregate.declared_only, 1);
        assert!((aggregate.enforcement_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stale_when_coverage_map_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let evidence = dir.path().join("latest_audit.json");
        std::fs::write(&evidence, "{}").expect("write");
        assert!(is_stale(&dir.path().join("coverage_map.json"), &evidence));
    }
}
