//! Command-line interface definitions for dupescan.
//!
//! This module defines all CLI arguments using the clap derive API,
//! plus the interactive classification prompt used when a scan runs on
//! a terminal.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory, write the report next to the current dir
//! dupescan scan ~/Downloads
//!
//! # Unattended run: no prompt, explicit tag and report location
//! dupescan scan ~/Downloads --yes --tag scout --output-dir /var/reports
//!
//! # Exclude empty files and throttle hashing workers
//! dupescan scan ~/Downloads --skip-empty --threads 2
//! ```

use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::report::ClassificationTag;

/// Content-based duplicate file scanner.
///
/// dupescan walks a directory tree, fingerprints every file with
/// BLAKE3, groups files with identical content, and writes a JSON
/// report summarizing duplicate groups and reclaimable space. It never
/// deletes or modifies scanned files.
#[derive(Debug, Parser)]
#[command(name = "dupescan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report errors as structured JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for dupescan.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files and write a report
    Scan(ScanArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Directory the JSON report is written into
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Classification tag recorded in the report
    ///
    /// When omitted on an interactive run, a short prompt asks for
    /// one; unattended runs fall back to "sage".
    #[arg(long, value_enum, value_name = "TAG")]
    pub tag: Option<ClassificationTag>,

    /// Skip the classification prompt (for unattended runs)
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Exclude zero-byte files from the scan
    ///
    /// Empty files all share one digest, so by default they are
    /// reported as a duplicate group.
    #[arg(long)]
    pub skip_empty: bool,

    /// Follow symbolic links during the scan
    ///
    /// Link cycles are detected and skipped.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Number of concurrent hashing workers
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", default_value = "4")]
    pub threads: usize,

    /// Glob patterns to exclude (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,
}

/// Interactively ask for a classification tag.
///
/// Mirrors the numbered menu operators know: 1-4 pick a tag, anything
/// else (including read failures) falls back to the default `sage`.
pub fn prompt_for_tag() -> ClassificationTag {
    prompt_for_tag_from(&mut std::io::stdin().lock(), &mut std::io::stdout())
}

fn prompt_for_tag_from<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> ClassificationTag {
    let _ = writeln!(output, "Choose a classification for this report:");
    let _ = writeln!(output, "  1. warrior   (aggressive cleanup planning)");
    let _ = writeln!(output, "  2. sage      (careful analysis)");
    let _ = writeln!(output, "  3. detective (detailed investigation)");
    let _ = writeln!(output, "  4. scout     (quick overview)");
    let _ = write!(output, "Selection [2]: ");
    let _ = output.flush();

    let mut line = String::new();
    if input.read_line(&mut line).is_err() {
        return ClassificationTag::default();
    }

    match line.trim() {
        "1" => ClassificationTag::Warrior,
        "3" => ClassificationTag::Detective,
        "4" => ClassificationTag::Scout,
        _ => ClassificationTag::default(),
    }
}
