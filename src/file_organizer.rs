//! Folder jobs: preparing category directories and placing files into them.
//!
//! A [`FolderJob`] pairs a target directory with its [`CategoryMap`].
//! Running it creates one subdirectory per category, takes a single
//! snapshot of the target's regular files, and moves each file whose
//! extension matches a category into that category's subdirectory.

use crate::category::{CategoryMap, SpecError};
use crate::config::CompiledFilters;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while running a folder job.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The target path exists but is not a directory.
    #[error("{} is not a directory", .path.display())]
    TargetNotADirectory { path: PathBuf },
    /// Creating a category directory was refused by the filesystem.
    #[error("permission denied creating {}", .path.display())]
    PermissionDenied { path: PathBuf, source: io::Error },
    #[error("failed to create directory {}: {source}", .path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDirFailed { path: PathBuf, source: io::Error },
    /// A file could not be relocated into its category directory.
    #[error("failed to move {} to {}: {source}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    /// The folder's custom category specification could not be parsed.
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// One target directory and the mapping used to sort it.
#[derive(Debug, Clone)]
pub struct FolderJob {
    pub target: PathBuf,
    pub categories: CategoryMap,
}

impl FolderJob {
    pub fn new(target: impl Into<PathBuf>, categories: CategoryMap) -> Self {
        Self {
            target: target.into(),
            categories,
        }
    }
}

/// A regular file found directly under the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
}

/// A file relocation, planned or performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub file: String,
    pub category: String,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A file that could not be moved.
#[derive(Debug, Clone, Serialize)]
pub struct MoveFailure {
    pub file: String,
    pub error: String,
}

/// Outcome of a completed folder job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobReport {
    pub target: PathBuf,
    /// Files moved (or, for a preview, that would be moved).
    pub moved: Vec<Placement>,
    /// Files whose extension matched no category.
    pub unmatched: Vec<String>,
    /// Files skipped by the exclude filters.
    pub excluded: Vec<String>,
    pub failures: Vec<MoveFailure>,
}

impl JobReport {
    fn new(target: &Path) -> Self {
        Self {
            target: target.to_path_buf(),
            ..Default::default()
        }
    }

    /// True if every matched file reached its category directory.
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs folder jobs against the filesystem.
pub struct FileOrganizer<'a> {
    filters: &'a CompiledFilters,
}

impl<'a> FileOrganizer<'a> {
    pub fn new(filters: &'a CompiledFilters) -> Self {
        Self { filters }
    }

    /// Prepares the category directories and places every matching file.
    ///
    /// Job-level failures (bad target, directory creation, unreadable
    /// directory) abort the job. A file that cannot be moved is recorded in
    /// the report and the remaining files are still attempted.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use sortkit::category::CategoryMap;
    /// use sortkit::config::CompiledFilters;
    /// use sortkit::file_organizer::{FileOrganizer, FolderJob};
    ///
    /// let filters = CompiledFilters::default();
    /// let job = FolderJob::new("/home/me/Downloads", CategoryMap::builtin().clone());
    /// match FileOrganizer::new(&filters).run(&job) {
    ///     Ok(report) => println!("moved {} files", report.moved.len()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn run(&self, job: &FolderJob) -> OrganizeResult<JobReport> {
        prepare_directories(&job.target, &job.categories)?;
        let entries = scan(&job.target)?;
        let (mut report, placements) = self.plan(job, entries);

        for placement in placements {
            match move_file(&placement.from, &placement.to) {
                Ok(()) => report.moved.push(placement),
                Err(e) => report.failures.push(MoveFailure {
                    file: placement.file,
                    error: e.to_string(),
                }),
            }
        }

        Ok(report)
    }

    /// Computes what [`run`](Self::run) would do without touching the filesystem.
    pub fn preview(&self, job: &FolderJob) -> OrganizeResult<JobReport> {
        ensure_directory_target(&job.target)?;
        let entries = if job.target.exists() {
            scan(&job.target)?
        } else {
            Vec::new()
        };
        let (mut report, placements) = self.plan(job, entries);
        report.moved = placements;
        Ok(report)
    }

    fn plan(&self, job: &FolderJob, entries: Vec<FileEntry>) -> (JobReport, Vec<Placement>) {
        let mut report = JobReport::new(&job.target);
        let mut placements = Vec::new();

        for entry in entries {
            if !self.filters.should_include(&entry.path) {
                report.excluded.push(entry.name);
                continue;
            }

            match job.categories.category_for(&entry.name) {
                Some(category) => {
                    let to = job.target.join(category.name()).join(&entry.name);
                    placements.push(Placement {
                        file: entry.name,
                        category: category.name().to_string(),
                        from: entry.path,
                        to,
                    });
                }
                None => report.unmatched.push(entry.name),
            }
        }

        (report, placements)
    }
}

fn ensure_directory_target(target: &Path) -> OrganizeResult<()> {
    if target.exists() && !target.is_dir() {
        return Err(OrganizeError::TargetNotADirectory {
            path: target.to_path_buf(),
        });
    }
    Ok(())
}

/// Ensures `<target>/<category>` exists for every category in `categories`.
///
/// Existing directories are left alone. A missing target is created along
/// with its category directories.
pub fn prepare_directories(target: &Path, categories: &CategoryMap) -> OrganizeResult<Vec<PathBuf>> {
    ensure_directory_target(target)?;

    let mut created = Vec::with_capacity(categories.len());
    for category in categories.iter() {
        let path = target.join(category.name());
        if let Err(e) = fs::create_dir_all(&path) {
            return Err(match e.kind() {
                io::ErrorKind::PermissionDenied => OrganizeError::PermissionDenied { path, source: e },
                io::ErrorKind::NotADirectory => OrganizeError::TargetNotADirectory {
                    path: target.to_path_buf(),
                },
                _ => OrganizeError::DirectoryCreationFailed { path, source: e },
            });
        }
        created.push(path);
    }
    Ok(created)
}

/// Snapshots the regular files directly under `target`, sorted by name.
///
/// Symlinks are followed, so a link to a regular file is listed. Names
/// that are not valid UTF-8 are skipped.
pub fn scan(target: &Path) -> OrganizeResult<Vec<FileEntry>> {
    let read_dir = |e| OrganizeError::ReadDirFailed {
        path: target.to_path_buf(),
        source: e,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(target).map_err(read_dir)? {
        let entry = entry.map_err(read_dir)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            entries.push(FileEntry { name, path });
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Moves `from` to `to` without ever replacing an existing file.
///
/// Falls back to copy and remove when the rename crosses filesystems.
pub fn move_file(from: &Path, to: &Path) -> OrganizeResult<()> {
    let failed = |source| OrganizeError::MoveFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if to.exists() {
        return Err(failed(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        )));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_remove(from, to).map_err(failed)
        }
        Err(e) => Err(failed(e)),
    }
}

/// Copies `from` to `to`, then removes `from`.
///
/// If the source cannot be removed the copy is deleted again, so the file
/// ends up in exactly one place.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        let _ = fs::remove_file(to);
        return Err(e);
    }
    Ok(())
}
