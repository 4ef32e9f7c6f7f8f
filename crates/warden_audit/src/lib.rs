// SPDX-License-Identifier: Apache-2.0

#![doc = include_str!("../README.md")]

mod dispatcher;
mod result;

use std::collections::HashSet;

use warden_checks::{AuditContext, Catalog, RuleCheck};
use warden_policy::PolicyRegistry;
use warden_postprocess::{postprocess, PostprocessConfig};

pub use result::{AuditResult, AuditStats};

/// Runs every check in `catalog` against `context` and returns the
/// postprocessed result. This is the primary operation (C4): the Auditor.
#[must_use]
pub fn run_full_audit(
    context: &AuditContext,
    registry: &PolicyRegistry,
    catalog: &Catalog,
    config: &PostprocessConfig,
    entry_point_files: &HashSet<String>,
) -> AuditResult {
    let checks: Vec<&dyn RuleCheck> = catalog.all().collect();
    run(context, registry, catalog, &checks, config, entry_point_files)
}

/// Runs only `checks` (a caller-selected subset of `catalog`, typically via
/// [`Catalog::checks_matching_patterns`] or
/// [`Catalog::checks_matching_policy`]) against `context`. Checks outside
/// `checks` are not counted as executed (C5, the Filtered-Audit Runner).
#[must_use]
pub fn run_filtered_audit(
    context: &AuditContext,
    registry: &PolicyRegistry,
    catalog: &Catalog,
    checks: &[&dyn RuleCheck],
    config: &PostprocessConfig,
    entry_point_files: &HashSet<String>,
) -> AuditResult {
    run(context, registry, catalog, checks, config, entry_point_files)
}

fn run(
    context: &AuditContext,
    registry: &PolicyRegistry,
    catalog: &Catalog,
    checks: &[&dyn RuleCheck],
    config: &PostprocessConfig,
    entry_point_files: &HashSet<String>,
) -> AuditResult {
    let (raw_findings, executed_rule_ids, crashed_rule_ids) = dispatcher::dispatch(context, checks);

    let postprocessed = postprocess(raw_findings, registry, entry_point_files, config);

    let total_declared_rules = registry.rule_count();
    let total_executable_rules = registry.rules().filter(|r| r.engine.is_some()).count();
    let executed_dynamic_rules = executed_rule_ids.len();
    let crashed_rules = crashed_rule_ids.len();

    let bound_engine_names: HashSet<&str> = catalog
        .all()
        .flat_map(|check| check.rule_ids().iter().map(String::as_str))
        .collect();
    let unmapped_rules = registry
        .rules()
        .filter(|r| r.engine.is_some() && !bound_engine_names.contains(r.rule_id.as_str()))
        .count();

    let coverage_percent = percent(executed_dynamic_rules, total_executable_rules);
    let effective_coverage_percent = percent(
        executed_dynamic_rules.saturating_sub(crashed_rules),
        total_executable_rules,
    );

    let stats = AuditStats {
        total_declared_rules,
        total_executable_rules,
        executed_dynamic_rules,
        crashed_rules,
        unmapped_rules,
        coverage_percent,
        effective_coverage_percent,
    };

    AuditResult {
        audit_id: uuid::Uuid::new_v4(),
        timestamp: chrono::Utc::now(),
        findings: postprocessed.findings,
        ignored: postprocessed.ignored,
        executed_rule_ids,
        stats,
        verdict: postprocessed.verdict,
    }
}

fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use warden_common::severity::Severity;
    use warden_postprocess::Verdict;

    fn registry_from(doc: &str) -> PolicyRegistry {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("demo.json"), doc).expect("write");
        PolicyRegistry::load(dir.path()).expect("load").0
    }

    #[test]
    fn empty_repo_and_empty_registry_passes_with_no_findings() {
        let registry = PolicyRegistry::default();
        let catalog = Catalog::new(Vec::new(), &registry).expect("catalog");
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("src")).expect("mkdir");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));

        let result = run_full_audit(
            &context,
            &registry,
            &catalog,
            &PostprocessConfig::default(),
            &HashSet::new(),
        );

        assert!(result.findings.is_empty());
        assert!(result.executed_rule_ids.is_empty());
        assert_eq!(result.verdict, Verdict::Pass);
        assert!(result.passed());
    }

    #[test]
    fn compliant_file_passes_and_marks_the_rule_executed() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "demo.must_have_docstring", "statement": "x", "severity": "error",
                 "enforcement": "blocking", "engine": {"engine": "DocstringCheck"}}
            ]}"#,
        );
        let catalog = Catalog::new(
            warden_checks::checks::style::DocstringCheck::bind(&registry),
            &registry,
        )
        .expect("catalog");
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), "def f():\n    \"\"\"doc\"\"\"\n    pass\n").expect("write");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));

        let result = run_full_audit(
            &context,
            &registry,
            &catalog,
            &PostprocessConfig::default(),
            &HashSet::new(),
        );

        assert!(result.findings.is_empty());
        assert!(result.executed_rule_ids.contains("demo.must_have_docstring"));
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn violating_file_fails_with_one_finding() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "demo.must_have_docstring", "statement": "x", "severity": "error",
                 "enforcement": "blocking", "engine": {"engine": "DocstringCheck"}}
            ]}"#,
        );
        let catalog = Catalog::new(
            warden_checks::checks::style::DocstringCheck::bind(&registry),
            &registry,
        )
        .expect("catalog");
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.py"), "def f():\n    pass\n").expect("write");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));

        let result = run_full_audit(
            &context,
            &registry,
            &catalog,
            &PostprocessConfig::default(),
            &HashSet::new(),
        );

        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.check_id, "demo.must_have_docstring");
        assert_eq!(finding.severity, Severity::Error);
        assert_eq!(finding.file_path.as_deref(), Some("a.py"));
        assert_eq!(finding.line, Some(1));
        assert_eq!(result.verdict, Verdict::Fail);
        assert!(!result.passed());
    }

    #[test]
    fn filtered_audit_only_executes_matching_rules() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "r.a", "statement": "x", "severity": "info", "engine": {"engine": "DocstringCheck"}},
                {"id": "r.b", "statement": "y", "severity": "info", "engine": {"engine": "DocstringCheck"}},
                {"id": "r.c", "statement": "z", "severity": "info"}
            ]}"#,
        );
        let catalog = Catalog::new(
            warden_checks::checks::style::DocstringCheck::bind(&registry),
            &registry,
        )
        .expect("catalog");
        let dir = tempfile::tempdir().expect("tempdir");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));

        let pattern = regex::Regex::new(r"^r\.a$").expect("regex");
        let checks = catalog.checks_matching_patterns(&[pattern]);
        let result = run_filtered_audit(
            &context,
            &registry,
            &catalog,
            &checks,
            &PostprocessConfig::default(),
            &HashSet::new(),
        );

        assert_eq!(
            result.executed_rule_ids,
            ["r.a".to_owned()].into_iter().collect()
        );
    }

    struct CrashingCheck {
        rule_ids: Vec<String>,
    }

    impl RuleCheck for CrashingCheck {
        fn rule_ids(&self) -> &[String] {
            &self.rule_ids
        }
        fn category(&self) -> &str {
            "crashing"
        }
        fn target_scope(&self) -> warden_checks::TargetScope {
            warden_checks::TargetScope::Global
        }
        fn verify(&self, _context: &AuditContext, _target: &warden_checks::Target) -> Vec<warden_checks::Finding> {
            panic!("synthetic crash for coverage of the crash-capture path");
        }
    }

    #[test]
    fn a_crashing_check_is_captured_as_a_finding_and_fails_the_run() {
        let registry = registry_from(
            r#"{"id": "demo", "rules": [
                {"id": "r.x", "statement": "x", "severity": "info", "engine": {"engine": "Crasher"}}
            ]}"#,
        );
        let check: Box<dyn RuleCheck> = Box::new(CrashingCheck {
            rule_ids: vec!["r.x".to_owned()],
        });
        let catalog = Catalog::new(vec![check], &registry).expect("catalog");
        let dir = tempfile::tempdir().expect("tempdir");
        let context = AuditContext::new(dir.path().to_path_buf(), PathBuf::from(".intent"));

        let result = run_full_audit(
            &context,
            &registry,
            &catalog,
            &PostprocessConfig::default(),
            &HashSet::new(),
        );

        assert!(result.executed_rule_ids.contains("r.x"));
        assert_eq!(result.stats.crashed_rules, 1);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].check_id, "internal.audit.crash");
        assert_eq!(result.findings[0].severity, Severity::Error);
        assert_eq!(result.verdict, Verdict::Fail);
    }
}
