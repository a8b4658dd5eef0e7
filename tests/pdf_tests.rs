//! Integration tests for manage-pdf
//!
//! Input documents are generated with `lopdf`; every page carries a text
//! label like `p1-0` so page order can be checked after a merge or split.

use indicatif::ProgressBar;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use sortkit::pdf::{self, PageRange, PdfError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Writes a PDF with `pages` pages labelled `<label>-0`, `<label>-1`, ...
///
/// Resources and MediaBox live on the page tree root, so pages rely on
/// inheritance.
fn build_pdf(path: &Path, label: &str, pages: usize) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("{label}-{n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("Failed to encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("Failed to save test PDF");
}

/// Labels of every page, in page order.
fn page_labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("Failed to load PDF");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).expect("page has content");
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').expect("label start") + 1;
            let end = text[start..].find(')').expect("label end") + start;
            text[start..end].to_string()
        })
        .collect()
}

fn labels(label: &str, pages: std::ops::Range<usize>) -> Vec<String> {
    pages.map(|n| format!("{label}-{n}")).collect()
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_merge_keeps_input_order() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let p1 = dir.path().join("p1.pdf");
    let p2 = dir.path().join("p2.pdf");
    let out = dir.path().join("out.pdf");
    build_pdf(&p1, "p1", 3);
    build_pdf(&p2, "p2", 2);

    let summary = pdf::merge_files(&[p1, p2], &out, &ProgressBar::hidden()).expect("merge");

    assert_eq!(summary.inputs, 2);
    assert_eq!(summary.pages, 5);
    let mut expected = labels("p1", 0..3);
    expected.extend(labels("p2", 0..2));
    assert_eq!(page_labels(&out), expected);
}

#[test]
fn test_merge_copies_inherited_attributes() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    let out = dir.path().join("out.pdf");
    build_pdf(&a, "a", 1);
    build_pdf(&b, "b", 1);

    pdf::merge_files(&[a, b], &out, &ProgressBar::hidden()).expect("merge");

    let doc = Document::load(&out).expect("Failed to load merged PDF");
    for page_id in doc.get_pages().into_values() {
        let page = doc.get_dictionary(page_id).expect("page dictionary");
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }
}

#[test]
fn test_merge_same_file_twice() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let a = dir.path().join("a.pdf");
    let out = dir.path().join("out.pdf");
    build_pdf(&a, "a", 2);

    pdf::merge_files(&[a.clone(), a], &out, &ProgressBar::hidden()).expect("merge");

    let mut expected = labels("a", 0..2);
    expected.extend(labels("a", 0..2));
    assert_eq!(page_labels(&out), expected);
}

#[test]
fn test_merge_missing_input() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let inputs = vec![dir.path().join("missing.pdf")];

    let result = pdf::merge_files(&inputs, &dir.path().join("out.pdf"), &ProgressBar::hidden());

    assert!(matches!(result, Err(PdfError::Load { .. })));
    assert!(!dir.path().join("out.pdf").exists());
}

#[test]
fn test_merge_without_inputs() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let result = pdf::merge_files(&[], &dir.path().join("out.pdf"), &ProgressBar::hidden());
    assert!(matches!(result, Err(PdfError::NoInputs)));
}

// ============================================================================
// Split
// ============================================================================

#[test]
fn test_split_by_ranges() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = dir.path().join("big.pdf");
    build_pdf(&input, "src", 20);
    let ranges = PageRange::from_pairs(&[0, 5, 5, 10]).expect("ranges");

    let parts =
        pdf::split_file(&input, &ranges, dir.path(), &ProgressBar::hidden()).expect("split");

    let paths: Vec<PathBuf> = parts.iter().map(|p| p.path.clone()).collect();
    assert_eq!(
        paths,
        [dir.path().join("0_output.pdf"), dir.path().join("1_output.pdf")]
    );
    assert_eq!(page_labels(&paths[0]), labels("src", 0..5));
    assert_eq!(page_labels(&paths[1]), labels("src", 5..10));
    assert_eq!(parts[0].pages, 5);
}

#[test]
fn test_split_clamps_ranges_past_the_end() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = dir.path().join("short.pdf");
    build_pdf(&input, "s", 4);

    let parts = pdf::split_file(
        &input,
        &[PageRange::new(2, 100)],
        dir.path(),
        &ProgressBar::hidden(),
    )
    .expect("split");

    assert_eq!(parts[0].pages, 2);
    assert_eq!(page_labels(&parts[0].path), labels("s", 2..4));
}

#[test]
fn test_split_creates_output_dir() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = dir.path().join("in.pdf");
    build_pdf(&input, "x", 3);
    let out_dir = dir.path().join("parts");

    let parts = pdf::split_file(
        &input,
        &[PageRange::new(0, 1)],
        &out_dir,
        &ProgressBar::hidden(),
    )
    .expect("split");

    assert_eq!(parts[0].path, out_dir.join("0_output.pdf"));
    assert!(parts[0].path.is_file());
}

#[test]
fn test_split_document_leaves_source_untouched() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let input = dir.path().join("in.pdf");
    build_pdf(&input, "x", 6);
    let doc = pdf::load(&input).expect("load");

    let parts = pdf::split_document(&doc, &[PageRange::new(0, 2), PageRange::new(4, 6)]);

    assert_eq!(pdf::page_count(&doc), 6);
    assert_eq!(parts.iter().map(pdf::page_count).collect::<Vec<_>>(), [2, 2]);
}
