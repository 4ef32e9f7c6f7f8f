// SPDX-License-Identifier: Apache-2.0

//! Human-readable renderings of the JSON artifacts, for reviewers who'd
//! rather not parse JSON by eye.

use warden_coverage::{CoverageMap, CoverageStatus};
use warden_postprocess::IgnoredFinding;

pub(crate) fn render_ignored(ignored: &[IgnoredFinding]) -> String {
    let mut out = String::from("# Auto-ignored findings\n\n");

    if ignored.is_empty() {
        out.push_str("No findings were auto-ignored this run.\n");
        return out;
    }

    out.push_str("| Rule | File | Reason |\n|---|---|---|\n");
    for entry in ignored {
        let file = entry.finding.file_path.as_deref().unwrap_or("-");
        out.push_str(&format!("| {} | {} | {} |\n", entry.finding.check_id, file, entry.reason));
    }
    out
}

pub(crate) fn render_coverage(map: &CoverageMap) -> String {
    let mut out = String::from("# Enforcement coverage map\n\n");
    out.push_str(if map.is_filtered {
        "_Computed against a filtered audit run._\n\n"
    } else {
        "_Computed against a full audit run._\n\n"
    });

    out.push_str("## Per policy\n\n");
    out.push_str("| Policy | Enforced | Implementable | Filtered out | Declared only | Enforcement rate |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for (policy_id, aggregate) in &map.per_policy {
        out.push_str(&format!(
            "| {policy_id} | {} | {} | {} | {} | {:.1}% |\n",
            aggregate.enforced, aggregate.implementable, aggregate.filtered_out, aggregate.declared_only, aggregate.enforcement_rate
        ));
    }

    out.push_str("\n## Uncovered error-severity rules\n\n");
    if map.uncovered_error_rules.is_empty() {
        out.push_str("None.\n");
    } else {
        for rule_id in &map.uncovered_error_rules {
            out.push_str(&format!("- {rule_id}\n"));
        }
    }

    out.push_str("\n## Top declared-only gaps\n\n");
    if map.gap_samples.is_empty() {
        out.push_str("None.\n");
    } else {
        out.push_str("| Rule | Policy | Severity |\n|---|---|---|\n");
        for entry in &map.gap_samples {
            out.push_str(&format!("| {} | {} | {} |\n", entry.rule_id, entry.policy_id, entry.severity));
        }
    }

    out.push_str(&format!(
        "\n## Full detail\n\n_{} rule(s) total; {} enforced._\n",
        map.entries.len(),
        map.entries.iter().filter(|e| e.status == CoverageStatus::Enforced).count(),
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use warden_audit::{AuditResult, AuditStats};
    use warden_checks::Finding;
    use warden_common::severity::Severity;
    use warden_postprocess::Verdict;

    #[test]
    fn empty_ignored_list_renders_a_clean_message() {
        let rendered = render_ignored(&[]);
        assert!(rendered.contains("No findings were auto-ignored"));
    }

    #[test]
    fn ignored_findings_render_one_table_row_each() {
        let ignored = vec![IgnoredFinding {
            finding: Finding::new("r.a", Severity::Warning, "noisy").with_file("a.py"),
            reason: "entry points are exempt".to_owned(),
        }];
        let rendered = render_ignored(&ignored);
        assert!(rendered.contains("r.a"));
        assert!(rendered.contains("entry points are exempt"));
    }

    #[test]
    fn coverage_map_renders_per_policy_and_gap_sections() {
        let audit_result = AuditResult {
            audit_id: uuid::Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            findings: Vec::new(),
            ignored: Vec::new(),
            executed_rule_ids: BTreeSet::new(),
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
        };
        let registry = warden_policy::PolicyRegistry::load(tempfile::tempdir().expect("tempdir").path())
            .expect("load")
            .0;
        let map = warden_coverage::coverage(&registry, &audit_result, false);
        let rendered = render_coverage(&map);
        assert!(rendered.contains("## Per policy"));
        assert!(rendered.contains("## Uncovered error-severity rules"));
    }
}
