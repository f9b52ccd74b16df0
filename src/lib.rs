//! dupescan - Concurrent duplicate file scanner
//!
//! Walks a directory tree, hashes eligible files on a bounded pool of
//! workers (BLAKE3), groups files by size and content digest, and can copy
//! one canonical file per duplicate group to a destination directory along
//! with a manifest of the other copies.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};

use crate::actions::extract::{extract_all, prepare_destination, ExtractReport};
use crate::cli::{Cli, Commands, CountArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::json::JsonOutput;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{count_matching, NamePatterns};

/// Run the application for parsed arguments.
///
/// # Errors
///
/// Returns an error for fatal failures: unreadable `--config` file, invalid
/// pattern, missing scan root, unusable extraction directory or an
/// unwritable JSON report. Per-file failures are reflected in the exit code
/// instead.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let Cli {
        verbose,
        quiet,
        config: config_path,
        command,
        ..
    } = cli;

    logging::init_logging(verbose, quiet);

    let config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load(),
    };

    match command {
        Commands::Scan(args) => run_scan(&args, &config, quiet),
        Commands::Count(args) => run_count(&args, &config),
    }
}

fn compile_patterns(cli_patterns: &[String], config: &Config) -> anyhow::Result<NamePatterns> {
    let sources = if cli_patterns.is_empty() {
        config.patterns.as_slice()
    } else {
        cli_patterns
    };
    NamePatterns::compile(sources).context("Invalid name pattern")
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let concurrency = args.concurrency.unwrap_or(config.concurrency).max(1);
    let detail = args.detail.unwrap_or(config.detail);
    let max_size = args
        .max_size_bytes()
        .or(config.max_size)
        .filter(|&bytes| bytes > 0);
    let patterns = compile_patterns(&args.patterns, config)?;

    if let Some(ref dest) = args.extract_to {
        prepare_destination(dest).context("Cannot set up extraction directory")?;
    }

    let total = if args.precount {
        let total = count_matching(&args.path, &patterns, detail);
        if !quiet {
            output::text::write_precount(&mut io::stdout().lock(), total)?;
        }
        Some(total)
    } else {
        None
    };

    let progress: Option<Arc<dyn ProgressCallback>> = if quiet || args.no_progress {
        None
    } else {
        Some(Arc::new(Progress::new(false)))
    };

    let mut finder_config = FinderConfig::default()
        .with_concurrency(concurrency)
        .with_max_size(max_size)
        .with_patterns(patterns)
        .with_detail(detail)
        .with_total_hint(total);
    if let Some(ref callback) = progress {
        finder_config = finder_config.with_progress_callback(Arc::clone(callback));
    }

    let finder = DuplicateFinder::new(finder_config);
    let (result, summary) = finder
        .find_duplicates(&args.path)
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;

    let extraction = args
        .extract_to
        .as_deref()
        .map(|dest| extract_all(&result, dest, progress.as_deref()));

    let had_errors = summary.has_errors()
        || extraction
            .as_ref()
            .is_some_and(|report| !report.all_succeeded());
    let exit_code = ExitCode::for_outcome(!result.duplicate_keys.is_empty(), had_errors);

    if let Some(ref json_path) = args.json {
        JsonOutput::new(&result, &summary, max_size, exit_code)
            .write_file(json_path)
            .with_context(|| format!("Failed to write JSON report {}", json_path.display()))?;
        log::info!("JSON report written to {}", json_path.display());
    }

    if !quiet {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Some(ref report) = extraction {
            write_extraction(&mut out, report)?;
        }
        output::text::write_report(&mut out, &result, start.elapsed())?;
        out.flush()?;
    }

    Ok(exit_code)
}

fn write_extraction<W: Write>(out: &mut W, report: &ExtractReport) -> io::Result<()> {
    for group in &report.extracted {
        writeln!(
            out,
            "Extracted {} -> {}",
            group.source.display(),
            group.copy.display()
        )?;
    }
    for (key, message) in &report.failures {
        writeln!(out, "Extraction failed for {key}: {message}")?;
    }
    if !report.extracted.is_empty() || !report.failures.is_empty() {
        writeln!(out)?;
    }
    Ok(())
}

fn run_count(args: &CountArgs, config: &Config) -> anyhow::Result<ExitCode> {
    ensure_directory(&args.path)?;
    let patterns = compile_patterns(&args.patterns, config)?;
    let total = count_matching(&args.path, &patterns, config.detail);
    println!("{total}");
    Ok(ExitCode::Success)
}

fn ensure_directory(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        bail!("Path not found: {}", path.display());
    }
    if !path.is_dir() {
        bail!("Not a directory: {}", path.display());
    }
    Ok(())
}
