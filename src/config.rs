//! TOML configuration for `clean-folder`.
//!
//! A configuration file can replace the built-in category mapping and
//! exclude files from being moved at all. It is only read when passed
//! explicitly with `--config`.
//!
//! # Configuration File Format
//!
//! ```toml
//! [[categories]]
//! name = "docs"
//! extensions = [".md", ".txt"]
//!
//! [[categories]]
//! name = "images"
//! extensions = [".png", ".jpg"]
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! extensions = ["part"]
//! patterns = ["*.tmp"]
//! regex = ["^~\\$"]
//! ```

use crate::category::{Category, CategoryMap, SpecError};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
    /// A category entry does not form a valid category.
    #[error("invalid category in configuration: {0}")]
    InvalidCategory(#[from] SpecError),
    #[error("invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    Io(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganizerConfig {
    /// Replacement for the built-in category mapping, in lookup order.
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,

    #[serde(default)]
    pub filters: FilterRules,
}

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Rules for files that are never moved.
    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g., "*.tmp").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, with or without the dot.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl OrganizerConfig {
    /// Loads configuration from `config_path`, or the defaults when `None`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist,
    /// `ConfigError::Io` if it cannot be read and
    /// `ConfigError::ConfigInvalid` if TOML parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// The mapping folders fall back to when they have no custom spec.
    ///
    /// Returns the built-in mapping unless the file lists categories.
    pub fn default_mapping(&self) -> Result<CategoryMap, ConfigError> {
        if self.categories.is_empty() {
            return Ok(CategoryMap::builtin().clone());
        }

        let categories = self
            .categories
            .iter()
            .map(|entry| Category::new(&entry.name, &entry.extensions))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CategoryMap::from_categories(categories))
    }

    /// Compile the filter rules for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters.exclude)
    }
}

/// Exclusion rules compiled once per run.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: &ExcludeRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_filenames: rules.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Check if a file may be moved (is not excluded).
    ///
    /// Only the file name is inspected: exact name, extension, glob, regex.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(exclude: ExcludeRules) -> CompiledFilters {
        OrganizerConfig {
            categories: Vec::new(),
            filters: FilterRules { exclude },
        }
        .compile_filters()
        .unwrap()
    }

    #[test]
    fn test_default_config_uses_builtin_mapping() {
        let config = OrganizerConfig::load(None).unwrap();
        assert_eq!(&config.default_mapping().unwrap(), CategoryMap::builtin());
    }

    #[test]
    fn test_default_filters_include_everything() {
        let compiled = OrganizerConfig::default().compile_filters().unwrap();
        assert!(compiled.should_include(Path::new(".DS_Store")));
        assert!(compiled.should_include(Path::new("photo.png")));
    }

    #[test]
    fn test_categories_from_toml_keep_order() {
        let config = OrganizerConfig::from_toml(
            r#"
            [[categories]]
            name = "zeta"
            extensions = ["md"]

            [[categories]]
            name = "alpha"
            extensions = [".PNG", ".md"]
            "#,
        )
        .unwrap();

        let map = config.default_mapping().unwrap();
        let names: Vec<&str> = map.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert_eq!(map.category_for("a.md").unwrap().name(), "zeta");
        assert_eq!(map.get("alpha").unwrap().extensions(), [".png", ".md"]);
    }

    #[test]
    fn test_invalid_category_entry() {
        let config = OrganizerConfig::from_toml(
            r#"
            [[categories]]
            name = "empty"
            extensions = []
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.default_mapping(),
            Err(ConfigError::InvalidCategory(SpecError::EmptySpec { .. }))
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            OrganizerConfig::from_toml("categories = 3"),
            Err(ConfigError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = OrganizerConfig::load(Some(Path::new("/non/existent/sortkit.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = filters(ExcludeRules {
            filenames: vec!["Thumbs.db".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("dir/Thumbs.db")));
        assert!(compiled.should_include(Path::new("image.jpg")));
    }

    #[test]
    fn test_exclude_extensions() {
        let compiled = filters(ExcludeRules {
            extensions: vec!["part".to_string(), ".tmp".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("movie.part")));
        assert!(!compiled.should_include(Path::new("file.TMP")));
        assert!(compiled.should_include(Path::new("file.txt")));
    }

    #[test]
    fn test_exclude_glob_patterns() {
        let compiled = filters(ExcludeRules {
            patterns: vec!["draft_*".to_string(), "[0-9]*.txt".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("/tmp/x/draft_notes.txt")));
        assert!(!compiled.should_include(Path::new("1report.txt")));
        assert!(compiled.should_include(Path::new("report.txt")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = filters(ExcludeRules {
            regex: vec![r"^~\$".to_string()],
            ..Default::default()
        });

        assert!(!compiled.should_include(Path::new("~$budget.xlsx")));
        assert!(compiled.should_include(Path::new("budget.xlsx")));
    }

    #[test]
    fn test_invalid_patterns_return_error() {
        let config = OrganizerConfig::from_toml(
            r#"
            [filters.exclude]
            regex = ["[invalid("]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.compile_filters(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let config = OrganizerConfig::from_toml(
            r#"
            [filters.exclude]
            patterns = ["[invalid"]
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.compile_filters(),
            Err(ConfigError::InvalidGlobPattern(_))
        ));
    }
}
