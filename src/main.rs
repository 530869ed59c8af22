//! # doclib CLI
//!
//! The `doclib` binary checks and repairs the frontmatter of a documentation
//! corpus. Every command reads the whole corpus, reports every problem it
//! finds, and exits non-zero only when a blocking error was found.
//!
//! ## Usage
//!
//! ```bash
//! doclib --config .doclib/config.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `doclib fix [--dry-run]` | Apply the normalization rules to every document |
//! | `doclib duplicates` | Find documents sharing a canonical URL and version |
//! | `doclib stale [--days N] [--report PATH]` | List documents captured too long ago |
//! | `doclib paths` | Check storage path naming conventions |
//! | `doclib validate` | Check every document's frontmatter against the schema |
//! | `doclib sources` | Compare source directories with the registry |
//! | `doclib stats` | Per-source statistics |
//! | `doclib check` | validate + paths + duplicates (+ sources) for CI |
//! | `doclib completions <shell>` | Print shell completions |

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use doclib::config::{self, DEFAULT_CONFIG_PATH, MAX_STALE_THRESHOLD_DAYS};
use doclib::report::{Outcome, OutputFormat};
use doclib::{check, duplicates, fix, paths, sources, stale, stats, validate};

/// doclib: integrity checks and auto-fixes for frontmatter-annotated docs.
///
/// All commands accept a `--config` flag pointing to a TOML file. A missing
/// config file is not an error; the defaults are used.
#[derive(Parser)]
#[command(
    name = "doclib",
    about = "Integrity checks and auto-fixes for a frontmatter-annotated documentation corpus",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Log debug detail to stderr. `RUST_LOG` takes precedence.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the normalization rules to every document.
    ///
    /// Rewrites frontmatter in place. Unknown keys and key order are kept.
    Fix {
        /// Show what would change without writing anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Find documents that share a canonical URL.
    ///
    /// Same URL and version in two files is an error. One URL under several
    /// versions is informational unless `duplicates.fail_on_multi_version`
    /// is set.
    Duplicates,

    /// List documents whose capture date is older than the threshold.
    ///
    /// Never fails the run.
    Stale {
        /// Threshold in days. Defaults to `quality.stale_threshold_days`.
        #[arg(
            long,
            env = "STALE_DAYS",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_STALE_THRESHOLD_DAYS))
        )]
        days: Option<u32>,

        /// Also write a markdown report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Check storage paths against the naming conventions.
    Paths,

    /// Check every document's frontmatter against the schema.
    Validate,

    /// Compare source directories and documents with the registry.
    Sources,

    /// Show per-source document counts, versions, and languages.
    Stats,

    /// Run validate, paths, duplicates, and sources together.
    Check,

    /// Print a shell completion script to stdout.
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "doclib", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let cfg = config::load_config(&cli.config)?;
    let format = cli.format;
    let now = Utc::now();

    let outcome: Outcome = match cli.command {
        Commands::Fix { dry_run } => {
            let summary = fix::run_fix(&cfg, dry_run)?;
            fix::print_fix_summary(&summary, format)?;
            summary.outcome
        }
        Commands::Duplicates => {
            let summary = duplicates::run_duplicates(&cfg)?;
            duplicates::print_duplicates_summary(&summary, format)?;
            summary.outcome
        }
        Commands::Stale { days, report } => {
            let threshold = match days {
                Some(days) => config::check_stale_threshold("--days", days)?,
                None => cfg.quality.stale_threshold_days,
            };
            let summary = stale::run_stale(&cfg, threshold, now)?;
            stale::print_stale_summary(&summary, format)?;
            if let Some(path) = report {
                stale::write_report(&path, &summary.report, now)?;
                if format == OutputFormat::Human {
                    println!("\nReport written to {}", path.display());
                }
            }
            summary.outcome
        }
        Commands::Paths => {
            let summary = paths::run_paths(&cfg)?;
            paths::print_paths_summary(&summary, format)?;
            summary.outcome
        }
        Commands::Validate => {
            let summary = validate::run_validate(&cfg, now)?;
            validate::print_validate_summary(&summary, format)?;
            summary.outcome
        }
        Commands::Sources => {
            let summary = sources::run_sources(&cfg)?;
            sources::print_sources_summary(&summary, &cfg, format)?;
            summary.outcome
        }
        Commands::Stats => {
            let summary = stats::run_stats(&cfg)?;
            stats::print_stats(&summary, format)?;
            Outcome::default()
        }
        Commands::Check => {
            let summary = check::run_check(&cfg, now)?;
            check::print_check_summary(&summary, format)?;
            summary.outcome()
        }
        Commands::Completions { .. } => unreachable!("handled before config loading"),
    };

    Ok(if outcome.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
