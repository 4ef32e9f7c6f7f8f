//! Warden CLI tool.

#![allow(clippy::print_stdout)]

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use clap::Parser;
use regex::Regex;

use warden_checks::{AuditContext, Catalog, Finding, RuleCheck};
use warden_common::{ConsoleLogger, Logger, NullLogger};
use warden_coverage::CoverageMap;
use warden_postprocess::PostprocessConfig;

use crate::cli::{
    AuditArgs, BaselineArgs, CheckCommand, Cli, CodeCommand, Commands, CoverageArgs, CoverageFormat, GovernanceCommand,
    SeverityArg,
};

mod cli;

#[cfg(not(tarpaulin_include))]
fn main() {
    let cli = Cli::parse();

    let exit_code = if cli.quiet {
        run_command(&cli, NullLogger)
    } else {
        run_command(&cli, ConsoleLogger::new())
    };

    #[allow(clippy::exit)]
    std::process::exit(exit_code);
}

fn run_command(cli: &Cli, log: impl Logger) -> i32 {
    match &cli.command {
        Commands::Check { command: CheckCommand::Audit(args) } => check_audit(cli, args, &log),
        Commands::Governance { command: GovernanceCommand::Coverage(args) } => governance_coverage(cli, args, &log),
        Commands::Code { command: CodeCommand::Baseline(args) } => code_baseline(cli, args, &log),
        Commands::Code { command: CodeCommand::Verify(args) } => code_verify(cli, args, &log),
    }
}

const USAGE_ERROR: i32 = 2;

fn check_audit(cli: &Cli, args: &AuditArgs, log: &impl Logger) -> i32 {
    let (registry, warnings) = match warden_policy::PolicyRegistry::load(&cli.intent_root) {
        Ok(loaded) => loaded,
        Err(error) => {
            log.error(&format!("policy registry failed to load: {error}"));
            return USAGE_ERROR;
        }
    };
    for warning in &warnings {
        log.warn(&warning.to_string());
    }

    let catalog = match Catalog::with_default_checks(&registry) {
        Ok(catalog) => catalog,
        Err(error) => {
            log.error(&format!("check catalog failed to build: {error}"));
            return USAGE_ERROR;
        }
    };

    let context = AuditContext::new(cli.repo_path.clone(), cli.intent_root.clone());
    let config = PostprocessConfig::default();
    let entry_point_files = HashSet::new();

    let is_filtered = !args.rules.is_empty() || !args.policies.is_empty();
    let audit_result = if is_filtered {
        let mut checks: Vec<&dyn RuleCheck> = Vec::new();
        if !args.rules.is_empty() {
            let patterns: Vec<Regex> = args
                .rules
                .iter()
                .filter_map(|rule_id| Regex::new(&format!("^{}$", regex::escape(rule_id))).ok())
                .collect();
            checks.extend(catalog.checks_matching_patterns(&patterns));
        }
        for policy_id in &args.policies {
            checks.extend(catalog.checks_matching_policy(&registry, policy_id));
        }
        checks.sort_by_key(|check| check.category());
        checks.dedup_by_key(|check| check.category());
        warden_audit::run_filtered_audit(&context, &registry, &catalog, &checks, &config, &entry_point_files)
    } else {
        warden_audit::run_full_audit(&context, &registry, &catalog, &config, &entry_point_files)
    };

    match warden_evidence::write_audit_result(&cli.reports_dir, &audit_result) {
        Ok(path) => log.info(&format!("wrote {}", path.display())),
        Err(error) => log.error(&format!("could not persist audit evidence: {error}")),
    }

    print_audit_summary(&audit_result, args, log);

    if audit_result.passed() {
        0
    } else {
        1
    }
}

fn print_audit_summary(audit_result: &warden_audit::AuditResult, args: &AuditArgs, log: &impl Logger) {
    let threshold = match args.severity {
        SeverityArg::Info => warden_common::Severity::Info,
        SeverityArg::Warning => warden_common::Severity::Warning,
        SeverityArg::Error => warden_common::Severity::Error,
    };

    let visible: Vec<&Finding> = audit_result
        .findings
        .iter()
        .filter(|finding| finding.severity >= threshold)
        .filter(|finding| match args.target.as_deref() {
            None => true,
            Some(target) => finding.file_path.as_deref().is_some_and(|path| path.starts_with(target)),
        })
        .collect();

    log.info(&format!(
        "verdict={:?} findings={} coverage={:.1}%",
        audit_result.verdict,
        audit_result.findings.len(),
        audit_result.stats.coverage_percent
    ));

    if args.verbose {
        for finding in visible {
            let location = finding.file_path.as_deref().unwrap_or("-");
            log.info(&format!("[{}] {} ({location}): {}", finding.severity, finding.check_id, finding.message));
        }
    }
}

fn governance_coverage(cli: &Cli, args: &CoverageArgs, log: &impl Logger) -> i32 {
    let (registry, _warnings) = match warden_policy::PolicyRegistry::load(&cli.intent_root) {
        Ok(loaded) => loaded,
        Err(error) => {
            log.error(&format!("policy registry failed to load: {error}"));
            return USAGE_ERROR;
        }
    };

    let coverage_map_path = cli.reports_dir.join("governance").join("enforcement_coverage_map.json");
    let audit_ledger_path = cli.reports_dir.join("audit").join("latest_audit.json");

    if !warden_coverage::is_stale(&coverage_map_path, &audit_ledger_path) {
        if let Some(map) = load_coverage_map(&coverage_map_path) {
            return render_coverage(&map, args, log);
        }
    }

    let audit_result = match load_last_audit_result(&cli.reports_dir) {
        Some(result) => result,
        None => {
            log.error("no prior audit evidence found; run 'check audit' first");
            return USAGE_ERROR;
        }
    };

    let map = warden_coverage::coverage(&registry, &audit_result, false);
    if let Err(error) = warden_evidence::write_coverage_map(&cli.reports_dir, &map) {
        log.error(&format!("could not persist coverage map: {error}"));
    }

    render_coverage(&map, args, log)
}

fn load_coverage_map(path: &Path) -> Option<CoverageMap> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn load_last_audit_result(reports_dir: &Path) -> Option<warden_audit::AuditResult> {
    let ledger: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(reports_dir.join("audit").join("latest_audit.json")).ok()?).ok()?;
    let findings: Vec<Finding> =
        serde_json::from_str(&std::fs::read_to_string(reports_dir.join("audit_findings.json")).ok()?).ok()?;
    let ignored_artifact: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(reports_dir.join("audit_auto_ignored.json")).ok()?).ok()?;
    let ignored: Vec<warden_postprocess::IgnoredFinding> = serde_json::from_value(ignored_artifact["items"].clone()).ok()?;

    let executed_rule_ids: BTreeSet<String> =
        serde_json::from_value(ledger["executed_rules"].clone()).unwrap_or_default();
    let stats: warden_audit::AuditStats = serde_json::from_value(ledger["stats"].clone()).ok()?;
    let verdict: warden_postprocess::Verdict = serde_json::from_value(ledger["verdict"].clone()).ok()?;

    Some(warden_audit::AuditResult {
        audit_id: serde_json::from_value(ledger["audit_id"].clone()).ok()?,
        timestamp: serde_json::from_value(ledger["timestamp"].clone()).ok()?,
        findings,
        ignored,
        executed_rule_ids,
        stats,
        verdict,
    })
}

fn render_coverage(map: &CoverageMap, args: &CoverageArgs, log: &impl Logger) -> i32 {
    let rendered = match args.format {
        CoverageFormat::Json => serde_json::to_string_pretty(map).expect("coverage map always serializes"),
        CoverageFormat::Summary => map
            .per_policy
            .iter()
            .map(|(policy_id, aggregate)| format!("{policy_id}: {:.1}% enforced", aggregate.enforcement_rate))
            .collect::<Vec<_>>()
            .join("\n"),
        CoverageFormat::Hierarchical => map
            .entries
            .iter()
            .map(|entry| format!("{} [{}] {:?}", entry.rule_id, entry.policy_id, entry.status))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    match &args.output {
        Some(path) => {
            if let Err(error) = std::fs::write(path, &rendered) {
                log.error(&format!("could not write coverage report to '{}': {error}", path.display()));
                return USAGE_ERROR;
            }
        }
        None => println!("{rendered}"),
    }

    if map.passed() {
        0
    } else {
        1
    }
}

fn code_baseline(cli: &Cli, args: &BaselineArgs, log: &impl Logger) -> i32 {
    let src_root = cli.repo_path.join("src");
    match warden_integrity::create_baseline(&src_root, &cli.reports_dir, &args.label) {
        Ok(path) => {
            log.success(&format!("baseline '{}' written to {}", args.label, path.display()));
            0
        }
        Err(error) => {
            log.error(&format!("baseline creation failed: {error}"));
            USAGE_ERROR
        }
    }
}

fn code_verify(cli: &Cli, args: &BaselineArgs, log: &impl Logger) -> i32 {
    let src_root = cli.repo_path.join("src");
    match warden_integrity::verify_integrity(&src_root, &cli.reports_dir, &args.label) {
        Ok(result) if result.ok => {
            log.success(&format!("baseline '{}' verified clean", args.label));
            0
        }
        Ok(result) => {
            for error in &result.errors {
                log.warn(error);
            }
            1
        }
        Err(error) => {
            log.error(&format!("baseline verification failed: {error}"));
            USAGE_ERROR
        }
    }
}
