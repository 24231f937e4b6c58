//! dupescan - Content-Based Duplicate File Scanner
//!
//! A cross-platform Rust CLI application that recursively scans a
//! directory tree, fingerprints file content with BLAKE3, groups files
//! sharing a digest, and writes a durable JSON report of duplicate
//! groups and reclaimable space. Scanned files are never modified.

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod signal;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::Context;

use crate::cli::{Cli, Commands, ScanArgs};
use crate::duplicates::{finder::format_size, DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::progress::{Progress, ProgressCallback};
use crate::report::{ClassificationTag, ScanReport};
use crate::scanner::ScanOptions;

/// Run the application with parsed CLI arguments.
///
/// Initializes logging, dispatches to the requested subcommand, and
/// returns the exit code for a completed run.
///
/// # Errors
///
/// Returns an error if the scan root is invalid, the scan is
/// interrupted, or the report cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Scan(args) => run_scan(args, cli.quiet),
    }
}

/// Execute a scan end to end: walk, hash, group, tag, persist.
fn run_scan(args: ScanArgs, quiet: bool) -> anyhow::Result<ExitCode> {
    let stop = signal::install_handler()?;

    let options = ScanOptions {
        include_empty_files: !args.skip_empty,
        follow_symlinks: args.follow_symlinks,
        ignore_patterns: args.ignore_patterns.clone(),
    };

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(quiet));
    let config = FinderConfig::default()
        .with_max_concurrency(args.threads)
        .with_scan_options(options)
        .with_stop_flag(stop.flag())
        .with_progress_callback(progress);

    let finder = DuplicateFinder::new(config);
    let (result, summary) = finder.scan(&args.path)?;

    let tag = resolve_tag(&args);
    let report = ScanReport::new(result, &summary, tag);

    let report_path = report
        .write_to_dir(&args.output_dir)
        .with_context(|| format!("Could not persist report to {}", args.output_dir.display()))?;

    if report.result.duplicate_group_count == 0 {
        log::info!("No duplicates found under {}", report.result.root.display());
    } else {
        log::info!(
            "{} duplicate groups, {} files, {} reclaimable",
            report.result.duplicate_group_count,
            report.result.duplicated_file_count,
            format_size(report.result.wasted_bytes)
        );
    }
    if report.skipped_files > 0 {
        log::warn!("{} items were skipped; see the report", report.skipped_files);
    }
    log::info!("Report written to {}", report_path.display());

    Ok(ExitCode::Success)
}

/// Pick the classification tag for this run.
///
/// An explicit `--tag` always wins. Otherwise unattended runs (`--yes`
/// or no terminal on stdin) use the default, and interactive runs get
/// the numbered prompt.
fn resolve_tag(args: &ScanArgs) -> ClassificationTag {
    if let Some(tag) = args.tag {
        return tag;
    }

    if args.yes || !std::io::stdin().is_terminal() {
        return ClassificationTag::default();
    }

    cli::prompt_for_tag()
}
