//! PDF merging and splitting on top of `lopdf`.
//!
//! All parsing and serialization is left to `lopdf`; this module only moves
//! page objects between documents.
//!
//! # Examples
//!
//! ```no_run
//! use indicatif::ProgressBar;
//! use sortkit::pdf::{merge_files, split_file, PageRange};
//! use std::path::{Path, PathBuf};
//!
//! let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let summary = merge_files(&inputs, Path::new("out.pdf"), &ProgressBar::hidden()).unwrap();
//! println!("wrote {} pages", summary.pages);
//!
//! let ranges = PageRange::from_pairs(&[0, 5, 5, 10]).unwrap();
//! let parts = split_file(Path::new("big.pdf"), &ranges, Path::new("."), &ProgressBar::hidden()).unwrap();
//! assert_eq!(parts[0].path, Path::new("./0_output.pdf"));
//! ```

use indicatif::ProgressBar;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic `Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Suffix of every file written by a split.
pub const SPLIT_SUFFIX: &str = "_output.pdf";

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to load {}: {source}", .path.display())]
    Load { path: PathBuf, source: lopdf::Error },
    #[error("failed to write {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },
    #[error("malformed PDF: {0}")]
    Malformed(#[from] lopdf::Error),
    #[error("malformed PDF: no {0} object found")]
    MissingStructure(&'static str),
    #[error("page ranges come in start/end pairs, got {0} values")]
    OddRangeCount(usize),
    #[error("no input documents given")]
    NoInputs,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type PdfResult<T> = Result<T, PdfError>;

/// A 0-based, end-exclusive page range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl PageRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Reads a flat list as consecutive `(start, end)` pairs.
    pub fn from_pairs(values: &[usize]) -> PdfResult<Vec<Self>> {
        if values.len() % 2 != 0 {
            return Err(PdfError::OddRangeCount(values.len()));
        }
        Ok(values
            .chunks_exact(2)
            .map(|pair| Self::new(pair[0], pair[1]))
            .collect())
    }

    /// The page indices selected from a document of `total` pages.
    ///
    /// Out-of-range bounds are clamped and an inverted range selects
    /// nothing, the way slicing a list would.
    pub fn clamp(&self, total: usize) -> Range<usize> {
        let start = self.start.min(total);
        let end = self.end.min(total).max(start);
        start..end
    }
}

/// Result of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub inputs: usize,
    pub pages: usize,
}

/// One file written by a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    pub path: PathBuf,
    pub pages: usize,
}

/// Loads a PDF document from disk.
pub fn load(path: &Path) -> PdfResult<Document> {
    Document::load(path).map_err(|source| PdfError::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes `doc` to `path`.
pub fn save(doc: &mut Document, path: &Path) -> PdfResult<()> {
    doc.save(path).map_err(|e| PdfError::Save {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}

pub fn page_count(doc: &Document) -> usize {
    doc.get_pages().len()
}

/// Name of the `index`-th split output.
pub fn split_output_name(index: usize) -> String {
    format!("{index}{SPLIT_SUFFIX}")
}

/// Concatenates the pages of `documents`, in order, into a new document.
///
/// The catalog and page-tree root of the first document are reused; the
/// page tree is rebuilt flat. Outlines are dropped.
pub fn merge_documents(documents: Vec<Document>) -> PdfResult<Document> {
    if documents.is_empty() {
        return Err(PdfError::NoInputs);
    }

    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            pages.push((page_id, flatten_page(&doc, page_id)?));
        }
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Dictionary)> = None;
    let mut page_tree: Option<(ObjectId, Dictionary)> = None;

    for (id, object) in objects {
        let kind = object.type_name().map(str::to_owned).unwrap_or_default();
        match kind.as_str() {
            "Catalog" => {
                if catalog.is_none() {
                    catalog = Some((id, object.as_dict()?.clone()));
                }
            }
            "Pages" => {
                if page_tree.is_none() {
                    page_tree = Some((id, object.as_dict()?.clone()));
                }
            }
            "Page" | "Outlines" | "Outline" => {}
            _ => {
                merged.objects.insert(id, object);
            }
        }
    }

    let (catalog_id, mut catalog) = catalog.ok_or(PdfError::MissingStructure("Catalog"))?;
    let (tree_id, mut tree) = page_tree.ok_or(PdfError::MissingStructure("Pages"))?;

    let kids: Vec<Object> = pages.iter().map(|(id, _)| Object::Reference(*id)).collect();
    let count = pages.len() as i64;
    for (page_id, mut page) in pages {
        page.set("Parent", Object::Reference(tree_id));
        merged.objects.insert(page_id, Object::Dictionary(page));
    }

    for key in INHERITABLE_KEYS {
        tree.remove(key);
    }
    tree.remove(b"Parent");
    tree.set("Kids", Object::Array(kids));
    tree.set("Count", Object::Integer(count));
    merged.objects.insert(tree_id, Object::Dictionary(tree));

    catalog.set("Pages", Object::Reference(tree_id));
    catalog.remove(b"Outlines");
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));

    merged.trailer.set("Root", Object::Reference(catalog_id));
    merged.max_id = merged.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
    merged.prune_objects();

    Ok(merged)
}

/// Copies inherited attributes onto the page so it can be re-parented.
fn flatten_page(doc: &Document, page_id: ObjectId) -> PdfResult<Dictionary> {
    let mut page = doc.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    let mut depth = 0;
    while let Some(parent_id) = parent {
        if depth == MAX_TREE_DEPTH {
            break;
        }
        let node = doc.get_dictionary(parent_id)?;
        for key in INHERITABLE_KEYS {
            if !page.has(key)
                && let Ok(value) = node.get(key)
            {
                page.set(key.to_vec(), value.clone());
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(page)
}

/// Produces one document per range, each holding only that range's pages.
pub fn split_document(doc: &Document, ranges: &[PageRange]) -> Vec<Document> {
    let total = page_count(doc);

    ranges
        .iter()
        .map(|range| {
            let keep = range.clamp(total);
            let drop: Vec<u32> = (0..total)
                .filter(|index| !keep.contains(index))
                .map(|index| index as u32 + 1)
                .collect();

            let mut part = doc.clone();
            part.delete_pages(&drop);
            part.prune_objects();
            part
        })
        .collect()
}

/// Merges `inputs` in order and writes the result to `output`.
pub fn merge_files(
    inputs: &[PathBuf],
    output: &Path,
    progress: &ProgressBar,
) -> PdfResult<MergeSummary> {
    if inputs.is_empty() {
        return Err(PdfError::NoInputs);
    }

    let mut documents = Vec::with_capacity(inputs.len());
    for input in inputs {
        progress.set_message(display_name(input));
        documents.push(load(input)?);
        progress.inc(1);
    }

    let mut merged = merge_documents(documents)?;
    save(&mut merged, output)?;

    Ok(MergeSummary {
        inputs: inputs.len(),
        pages: page_count(&merged),
    })
}

/// Splits `input` by `ranges`, writing `<out_dir>/<i>_output.pdf` per range.
pub fn split_file(
    input: &Path,
    ranges: &[PageRange],
    out_dir: &Path,
    progress: &ProgressBar,
) -> PdfResult<Vec<SplitPart>> {
    let doc = load(input)?;
    fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(ranges.len());
    for (index, mut part) in split_document(&doc, ranges).into_iter().enumerate() {
        let path = out_dir.join(split_output_name(index));
        progress.set_message(display_name(&path));
        save(&mut part, &path)?;
        written.push(SplitPart {
            pages: page_count(&part),
            path,
        });
        progress.inc(1);
    }

    Ok(written)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
