// SPDX-License-Identifier: Apache-2.0

//! Manage command line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line arguments.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Turn debugging information on.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Turn the quiet mode on (i.e., minimal output).
    #[arg(short, long)]
    pub quiet: bool,

    /// Root of the audited repository.
    #[arg(long, global = true, default_value = ".")]
    pub repo_path: PathBuf,

    /// Root of the constitutional/policy tree.
    #[arg(long, global = true, default_value = ".intent")]
    pub intent_root: PathBuf,

    /// Directory evidence artifacts are written under.
    #[arg(long, global = true, default_value = "reports")]
    pub reports_dir: PathBuf,

    /// List of supported commands.
    #[command(subcommand)]
    pub command: Commands,
}

/// Supported commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run a governance audit over the repository.
    Check {
        #[command(subcommand)]
        command: CheckCommand,
    },
    /// Inspect and regenerate enforcement coverage.
    Governance {
        #[command(subcommand)]
        command: GovernanceCommand,
    },
    /// Manage the integrity baseline.
    Code {
        #[command(subcommand)]
        command: CodeCommand,
    },
}

/// `check` subcommands.
#[derive(Subcommand)]
pub enum CheckCommand {
    /// Invokes the Auditor, exiting 1 on a FAIL verdict.
    Audit(AuditArgs),
}

/// Arguments for `check audit`.
#[derive(clap::Args)]
pub struct AuditArgs {
    /// Restrict the audit to a single target file or directory, repository-relative.
    pub target: Option<String>,

    /// Minimum severity to surface in the printed summary.
    #[arg(long, value_enum, default_value_t = SeverityArg::Info)]
    pub severity: SeverityArg,

    /// Restrict the run to checks declaring one of these rule ids (repeatable).
    #[arg(long = "rule")]
    pub rules: Vec<String>,

    /// Restrict the run to checks belonging to one of these policies (repeatable).
    #[arg(long = "policy")]
    pub policies: Vec<String>,

    /// Print every finding instead of only the summary.
    #[arg(long)]
    pub verbose: bool,
}

/// Severity levels accepted on the CLI.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SeverityArg {
    /// Informational findings and above.
    Info,
    /// Warning findings and above.
    Warning,
    /// Error findings only.
    Error,
}

/// `governance` subcommands.
#[derive(Subcommand)]
pub enum GovernanceCommand {
    /// Invokes the Coverage Analyzer, regenerating a stale map.
    Coverage(CoverageArgs),
}

/// Arguments for `governance coverage`.
#[derive(clap::Args)]
pub struct CoverageArgs {
    /// Rendering of the coverage report.
    #[arg(long, value_enum, default_value_t = CoverageFormat::Summary)]
    pub format: CoverageFormat,

    /// Write the rendered report to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Coverage report renderings.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum CoverageFormat {
    /// One line per policy.
    Summary,
    /// The full per-rule Markdown table.
    Hierarchical,
    /// Raw JSON.
    Json,
}

/// `code` subcommands.
#[derive(Subcommand)]
pub enum CodeCommand {
    /// Snapshots `src/` as a new integrity baseline.
    Baseline(BaselineArgs),
    /// Verifies the live tree against a previously stored baseline.
    Verify(BaselineArgs),
}

/// Shared arguments for `code baseline` / `code verify`.
#[derive(clap::Args)]
pub struct BaselineArgs {
    /// The baseline's identifying label.
    #[arg(long)]
    pub label: String,
}
