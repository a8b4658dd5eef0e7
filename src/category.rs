//! Category mapping used to decide where a file belongs.
//!
//! A [`CategoryMap`] is an ordered list of named categories, each owning a
//! list of lowercase extensions (with their leading dot). Lookups walk the
//! categories in order and stop at the first one that lists the extension.
//!
//! # Examples
//!
//! ```
//! use sortkit::category::CategoryMap;
//!
//! let map = CategoryMap::builtin();
//! assert_eq!(map.category_for("notes.TXT").map(|c| c.name()), Some("texts"));
//! assert_eq!(map.category_for("README"), None);
//!
//! let custom: CategoryMap = "docs:.md,.txt images:.png".parse().unwrap();
//! assert_eq!(custom.category_for("a.md").map(|c| c.name()), Some("docs"));
//! ```

use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Built-in mapping used when a folder has no custom specification.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("compressed", &[".deb", ".targ.gz", ".zip", ".rar"]),
    ("texts", &[".txt", ".doc", ".docx", ".odt"]),
    ("images", &[".jpg", ".jpeg", ".png", ".gif", ".svg"]),
    ("audio", &[".mp3", ".wav"]),
    ("pdfs", &[".pdf"]),
    ("dbs", &[".csv", ".sql"]),
    ("spreadsheets", &[".ods", ".xls", ".xlsx", ".xlsm"]),
    ("executables", &[".bin"]),
    ("code", &[".py", ".sh", ".html"]),
];

static BUILTIN: LazyLock<CategoryMap> = LazyLock::new(|| {
    let categories = DEFAULT_CATEGORIES
        .iter()
        .map(|(name, extensions)| Category {
            name: (*name).to_string(),
            extensions: extensions.iter().map(|ext| (*ext).to_string()).collect(),
        })
        .collect();
    CategoryMap { categories }
});

/// Errors produced while parsing a category specification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// A token is not of the form `category:ext1,ext2`.
    #[error("malformed category spec '{token}': {reason}")]
    MalformedSpec { token: String, reason: String },
    /// A token (or the whole spec) yields no extensions.
    #[error("category spec '{token}' lists no extensions")]
    EmptySpec { token: String },
}

/// A named bucket of file extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: Vec<String>,
}

impl Category {
    /// Builds a category, validating the name and normalizing extensions.
    ///
    /// Extensions are trimmed and lowercased; a missing leading dot is added
    /// and blanks are dropped. Duplicates are kept once, first position.
    pub fn new<I, S>(name: &str, extensions: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        validate_name(name)?;

        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim();
            if ext.is_empty() || ext == "." {
                continue;
            }
            let ext = if ext.starts_with('.') {
                ext.to_lowercase()
            } else {
                format!(".{}", ext.to_lowercase())
            };
            if !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }

        if normalized.is_empty() {
            return Err(SpecError::EmptySpec {
                token: name.to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            extensions: normalized,
        })
    }

    /// The category name, which is also the subdirectory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extensions owned by this category, lowercase with leading dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if `ext` (any case) belongs to this category.
    pub fn matches(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.extensions.iter().any(|known| *known == ext)
    }
}

fn validate_name(name: &str) -> Result<(), SpecError> {
    let reason = if name.is_empty() {
        "category name is empty"
    } else if name == "." || name == ".." {
        "category name cannot be '.' or '..'"
    } else if name.contains(['/', '\\']) {
        "category name cannot contain a path separator"
    } else {
        return Ok(());
    };
    Err(SpecError::MalformedSpec {
        token: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Ordered mapping from category name to extensions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryMap {
    categories: Vec<Category>,
}

impl CategoryMap {
    /// The built-in mapping, shared for the life of the process.
    pub fn builtin() -> &'static CategoryMap {
        &BUILTIN
    }

    /// Builds a mapping from already validated categories.
    ///
    /// A category whose name was already seen replaces the earlier
    /// extensions but keeps the earlier position.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        let mut map = Self::default();
        for category in categories {
            map.insert(category);
        }
        map
    }

    /// Parses a whitespace-separated list of `category:ext1,ext2` tokens.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortkit::category::{CategoryMap, SpecError};
    ///
    /// let map = CategoryMap::parse("docs:.md,.TXT").unwrap();
    /// assert_eq!(map.get("docs").unwrap().extensions(), [".md", ".txt"]);
    ///
    /// assert!(matches!(
    ///     CategoryMap::parse("docs"),
    ///     Err(SpecError::MalformedSpec { .. })
    /// ));
    /// assert!(matches!(
    ///     CategoryMap::parse("docs:"),
    ///     Err(SpecError::EmptySpec { .. })
    /// ));
    /// ```
    pub fn parse(spec: &str) -> Result<Self, SpecError> {
        let mut map = Self::default();

        for token in spec.split_whitespace() {
            let (name, extensions) =
                token
                    .split_once(':')
                    .ok_or_else(|| SpecError::MalformedSpec {
                        token: token.to_string(),
                        reason: "expected 'category:ext1,ext2'".to_string(),
                    })?;

            if extensions.contains(':') {
                return Err(SpecError::MalformedSpec {
                    token: token.to_string(),
                    reason: "more than one ':' separator".to_string(),
                });
            }

            let category = Category::new(name, extensions.split(',')).map_err(|e| match e {
                SpecError::EmptySpec { .. } => SpecError::EmptySpec {
                    token: token.to_string(),
                },
                SpecError::MalformedSpec { reason, .. } => SpecError::MalformedSpec {
                    token: token.to_string(),
                    reason,
                },
            })?;
            map.insert(category);
        }

        if map.is_empty() {
            return Err(SpecError::EmptySpec {
                token: spec.to_string(),
            });
        }

        Ok(map)
    }

    fn insert(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.name == category.name) {
            Some(existing) => existing.extensions = category.extensions,
            None => self.categories.push(category),
        }
    }

    /// Looks up a category by name.
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Iterates categories in mapping order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Finds the first category whose extensions include the file's extension.
    ///
    /// Files without an extension never match.
    pub fn category_for(&self, file_name: &str) -> Option<&Category> {
        let ext = extension_of(file_name);
        if ext.is_empty() {
            return None;
        }
        self.categories.iter().find(|c| c.matches(&ext))
    }
}

impl FromStr for CategoryMap {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Returns the lowercase extension of a file name, including its dot.
///
/// Leading dots are skipped, so `.bashrc` has no extension. A name without a
/// dot yields an empty string.
///
/// ```
/// use sortkit::category::extension_of;
///
/// assert_eq!(extension_of("photo.JPG"), ".jpg");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of(".bashrc"), "");
/// assert_eq!(extension_of("Makefile"), "");
/// ```
pub fn extension_of(file_name: &str) -> String {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[stem_start..].rfind('.') {
        Some(idx) => file_name[stem_start + idx..].to_lowercase(),
        None => String::new(),
    }
}
