//! Command-line interface for `clean-folder`.
//!
//! This module handles:
//! - Argument parsing
//! - Pairing folders with their category specs
//! - Running each folder job behind its own error boundary
//! - Dry-run previews and the JSON batch report

use crate::category::CategoryMap;
use crate::config::{ConfigError, OrganizerConfig};
use crate::file_organizer::{FileOrganizer, FolderJob, JobReport, OrganizeError};
use crate::output::OutputFormatter;
use clap::Parser;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Placeholder spec meaning "use the default mapping for this folder".
pub const DEFAULT_SPEC_PLACEHOLDER: &str = "-";

/// Sort the files of one or more folders into category subfolders.
#[derive(Debug, Clone, Parser)]
#[command(name = "clean-folder", version)]
#[command(
    about = "Move files into category subfolders by extension",
    after_help = "Example: clean-folder ~/Downloads ~/Desktop --custom-extensions \"docs:.md,.txt images:.png\""
)]
pub struct CleanFolderArgs {
    /// Folders to clean
    #[arg(required = true, value_name = "FOLDER")]
    pub folders: Vec<PathBuf>,

    /// One spec per folder, in folder order: "cat1:.ext1,.ext2 cat2:.ext3".
    /// Use "-" to keep the default mapping for a folder
    #[arg(long = "custom-extensions", num_args = 1.., value_name = "SPEC")]
    pub custom_extensions: Vec<String>,

    /// TOML file with default categories and exclude filters
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show what would be moved without touching the filesystem
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON report of the run to FILE
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Errors that stop the whole run before or after the jobs.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write report {}: {source}", .path.display())]
    Report { path: PathBuf, source: io::Error },
}

/// Outcome of one folder job, as recorded in the batch report.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    Cleaned(JobReport),
    Failed { target: PathBuf, error: String },
}

impl JobOutcome {
    pub fn target(&self) -> &Path {
        match self {
            JobOutcome::Cleaned(report) => &report.target,
            JobOutcome::Failed { target, .. } => target,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, JobOutcome::Failed { .. })
    }
}

/// Everything that happened during one invocation.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// RFC 3339 time the batch finished.
    pub finished_at: String,
    pub dry_run: bool,
    pub jobs: Vec<JobOutcome>,
}

/// Pairs each folder with its spec string, if any.
///
/// Folders past the end of `specs`, or whose spec is blank or `-`, get
/// `None` and use the default mapping.
pub fn pair_specs<'a>(folders: &'a [PathBuf], specs: &'a [String]) -> Vec<(&'a Path, Option<&'a str>)> {
    folders
        .iter()
        .enumerate()
        .map(|(idx, folder)| {
            let spec = specs
                .get(idx)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty() && *s != DEFAULT_SPEC_PLACEHOLDER);
            (folder.as_path(), spec)
        })
        .collect()
}

/// Builds the job for one folder, parsing its custom spec if present.
pub fn build_job(
    folder: &Path,
    spec: Option<&str>,
    default_mapping: &CategoryMap,
) -> Result<FolderJob, OrganizeError> {
    let categories = match spec {
        Some(spec) => CategoryMap::parse(spec)?,
        None => default_mapping.clone(),
    };
    Ok(FolderJob::new(folder, categories))
}

/// Runs every folder job in order and returns the batch report.
///
/// A failing job is reported with its folder and the next job still runs.
/// Only configuration and report-writing problems end the run early.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use sortkit::cli::{run_jobs, CleanFolderArgs};
///
/// let args = CleanFolderArgs::parse_from(["clean-folder", "/tmp/downloads"]);
/// let report = run_jobs(&args).expect("configuration is valid");
/// assert_eq!(report.jobs.len(), 1);
/// ```
pub fn run_jobs(args: &CleanFolderArgs) -> Result<BatchReport, CliError> {
    let config = OrganizerConfig::load(args.config.as_deref())?;
    let default_mapping = config.default_mapping()?;
    let filters = config.compile_filters()?;
    let organizer = FileOrganizer::new(&filters);

    if args.custom_extensions.len() > args.folders.len() {
        OutputFormatter::warning(&format!(
            "{} custom extension spec(s) given for {} folder(s); extra specs are ignored",
            args.custom_extensions.len(),
            args.folders.len()
        ));
    }

    let mut jobs = Vec::with_capacity(args.folders.len());
    for (folder, spec) in pair_specs(&args.folders, &args.custom_extensions) {
        let result = build_job(folder, spec, &default_mapping).and_then(|job| {
            if args.dry_run {
                organizer.preview(&job)
            } else {
                organizer.run(&job)
            }
        });

        let outcome = match result {
            Ok(report) => {
                print_job_report(&report, args.dry_run);
                JobOutcome::Cleaned(report)
            }
            Err(e) => {
                OutputFormatter::error(&format!("Error: {}. Skipping folder {}", e, folder.display()));
                JobOutcome::Failed {
                    target: folder.to_path_buf(),
                    error: e.to_string(),
                }
            }
        };
        jobs.push(outcome);
    }

    let batch = BatchReport {
        finished_at: chrono::Utc::now().to_rfc3339(),
        dry_run: args.dry_run,
        jobs,
    };

    if let Some(path) = &args.report {
        write_report(&batch, path)?;
    }

    Ok(batch)
}

fn write_report(batch: &BatchReport, path: &Path) -> Result<(), CliError> {
    let report_error = |source| CliError::Report {
        path: path.to_path_buf(),
        source,
    };
    let json = serde_json::to_string_pretty(batch)
        .map_err(|e| report_error(io::Error::new(io::ErrorKind::InvalidData, e)))?;
    fs::write(path, json).map_err(report_error)
}

fn print_job_report(report: &JobReport, dry_run: bool) {
    let target = report.target.display();

    if dry_run {
        OutputFormatter::dry_run_notice(&format!("Folder: {}", target));
        if report.moved.is_empty() {
            OutputFormatter::plain("  No files would be moved.");
        }
        for placement in &report.moved {
            OutputFormatter::plain(&format!(
                "  {} → {}/",
                placement.file, placement.category
            ));
        }
        OutputFormatter::summary_table(&category_counts(report), report.moved.len());
        return;
    }

    for failure in &report.failures {
        OutputFormatter::error(&format!("{}: {}", failure.file, failure.error));
    }
    if !report.excluded.is_empty() {
        OutputFormatter::info(&format!(
            "  {} file(s) left in place by exclude filters",
            report.excluded.len()
        ));
    }

    if report.is_complete_success() {
        OutputFormatter::success(&format!("Folder: {} has been cleaned", target));
    } else {
        OutputFormatter::warning(&format!(
            "Folder: {} cleaned with {} file(s) left behind",
            target,
            report.failures.len()
        ));
    }
}

/// Per-category counts of moved files, in first-seen order.
fn category_counts(report: &JobReport) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for placement in &report.moved {
        match counts.iter_mut().find(|(name, _)| *name == placement.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((placement.category.clone(), 1)),
        }
    }
    counts
}
