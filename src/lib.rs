//! sortkit - folder cleanup and PDF merge/split utilities
//!
//! This library backs two binaries:
//! - `clean-folder` sorts the files of one or more folders into category
//!   subfolders chosen by file extension
//! - `manage-pdf` merges PDF documents or splits one by page ranges

pub mod category;
pub mod cli;
pub mod config;
pub mod file_organizer;
pub mod output;
pub mod pdf;
pub mod pdf_cli;

pub use category::{Category, CategoryMap, SpecError};
pub use config::{CompiledFilters, ConfigError, OrganizerConfig};
pub use file_organizer::{FileOrganizer, FolderJob, JobReport, OrganizeError};
pub use pdf::{PageRange, PdfError};

pub use cli::{CleanFolderArgs, run_jobs};
