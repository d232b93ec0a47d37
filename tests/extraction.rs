//! PDF → text extraction against generated documents.

use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

use paper_harness::extract::{extract_text_file, ExtractFailure, ExtractOutcome};

/// Builds a PDF with one page per entry; `None` produces a blank page.
fn write_pdf(path: &Path, pages: &[Option<&str>]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn pages_are_separated_in_order() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("2401.00001v1.pdf");
    write_pdf(&pdf, &[Some("Page 1"), Some("Page 2"), Some("Page 3")]);

    let outcome = extract_text_file(&pdf).unwrap();
    let output = tmp.path().join("2401.00001v1.txt");
    assert_eq!(outcome, ExtractOutcome::Success(output.clone()));
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Page 1\n\nPage 2\n\nPage 3\n\n"
    );
}

#[test]
fn blank_pages_contribute_nothing() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("mixed.pdf");
    write_pdf(&pdf, &[Some("Page 1"), None, Some("Page 3")]);

    extract_text_file(&pdf).unwrap();
    assert_eq!(
        fs::read_to_string(tmp.path().join("mixed.txt")).unwrap(),
        "Page 1\n\nPage 3\n\n"
    );
}

#[test]
fn document_without_text_yields_empty_file() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("scanned.pdf");
    write_pdf(&pdf, &[None, None]);

    let outcome = extract_text_file(&pdf).unwrap();
    let output = outcome.output_path().unwrap().to_path_buf();
    assert_eq!(fs::read_to_string(output).unwrap(), "");
}

#[test]
fn existing_text_file_is_overwritten() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("again.pdf");
    let txt = tmp.path().join("again.txt");
    fs::write(&txt, "stale contents from an older run").unwrap();
    write_pdf(&pdf, &[Some("Page 1")]);

    extract_text_file(&pdf).unwrap();
    assert_eq!(fs::read_to_string(&txt).unwrap(), "Page 1\n\n");
}

#[test]
fn missing_file_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("absent.pdf");

    let outcome = extract_text_file(&pdf).unwrap();
    assert_eq!(
        outcome,
        ExtractOutcome::Failure(ExtractFailure::NotFound(pdf.clone()))
    );
    assert!(outcome.output_path().is_none());
    assert!(!tmp.path().join("absent.txt").exists());
}

#[test]
fn directory_path_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("folder.pdf");
    fs::create_dir(&dir).unwrap();

    let outcome = extract_text_file(&dir).unwrap();
    assert!(matches!(
        outcome,
        ExtractOutcome::Failure(ExtractFailure::NotFound(_))
    ));
}

#[test]
fn corrupted_file_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    let pdf = tmp.path().join("broken.pdf");
    fs::write(&pdf, b"%PDF-1.5\nthis is not really a pdf").unwrap();

    let outcome = extract_text_file(&pdf).unwrap();
    assert!(matches!(
        outcome,
        ExtractOutcome::Failure(ExtractFailure::Corrupted(_))
    ));
    assert!(!tmp.path().join("broken.txt").exists());
}
