//! CLI argument parsing for subtab.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Subtab: run configured external commands for report tabs.
///
/// Each tab section names an executable, its arguments and a GPS time. The
/// command runs without a shell; its stdout becomes the tab body, or a
/// diagnostic report when it cannot start, exits non-zero or times out.
#[derive(Parser, Debug)]
#[command(name = "subtab")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for subtab.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run tab commands and emit their bodies.
    ///
    /// Every selected tab is validated before any command is started.
    Run(RunArgs),

    /// Print each tab's argument vector without running it.
    Resolve(ResolveArgs),

    /// Validate a configuration file.
    Check(CheckArgs),
}

/// Tab selection shared by the commands that build tabs.
#[derive(Args, Debug, Clone)]
pub struct TabSelection {
    /// Path to the YAML configuration file.
    pub config: PathBuf,

    /// Only use these tabs (repeatable or comma-separated).
    #[arg(short, long = "tab", value_delimiter = ',')]
    pub tabs: Vec<String>,

    /// GPS time passed to every tab, replacing configured values.
    #[arg(long)]
    pub gpstime: Option<String>,
}

/// Body output format for `run`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Each body under a `==> tab <==` header.
    #[default]
    Text,
    /// A JSON array with one object per tab.
    Json,
    /// Print nothing (use with --output-dir).
    Silent,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: TabSelection,

    /// Write each body to DIR/<tab>.txt.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Append one NDJSON run record per tab to this file.
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Number of tabs to run at the same time.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: u32,

    /// Exit with code 3 if any tab's command failed.
    #[arg(long)]
    pub strict: bool,

    /// How to print bodies on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `resolve` command.
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub selection: TabSelection,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: TabSelection,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_options() {
        let cli = Cli::try_parse_from([
            "subtab",
            "-v",
            "run",
            "report.yaml",
            "--tab",
            "a,b",
            "-t",
            "c",
            "--gpstime",
            "1126259462",
            "--output-dir",
            "out",
            "--jobs",
            "4",
            "--strict",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.selection.config, PathBuf::from("report.yaml"));
        assert_eq!(args.selection.tabs, vec!["a", "b", "c"]);
        assert_eq!(args.selection.gpstime.as_deref(), Some("1126259462"));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.jobs, 4);
        assert!(args.strict);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["subtab", "run", "report.yaml"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.jobs, 1);
        assert!(!args.strict);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.selection.tabs.is_empty());
    }

    #[test]
    fn test_zero_jobs_is_rejected() {
        assert!(Cli::try_parse_from(["subtab", "run", "r.yaml", "--jobs", "0"]).is_err());
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["subtab", "-v", "-q", "check", "r.yaml"]).is_err());
    }
}
