//! PDF to plain-text extraction.
//!
//! [`extract_text_file`] renders every page of a PDF as text and writes the
//! result next to the source with a `.txt` extension. Each page with text
//! contributes that text followed by a blank line, so page boundaries stay
//! visible. The output is rewritten in full on every call.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result as AnyResult;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::{PaperError, Result};

/// Separator appended after the text of every non-empty page.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Why a document could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractFailure {
    /// The path does not name an existing file.
    #[error("file {} does not exist", .0.display())]
    NotFound(PathBuf),
    /// The file is not a parseable PDF.
    #[error("not a valid PDF: {0}")]
    Corrupted(String),
}

/// Terminal state of one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    Success(PathBuf),
    Failure(ExtractFailure),
}

impl ExtractOutcome {
    pub fn output_path(&self) -> Option<&Path> {
        match self {
            ExtractOutcome::Success(path) => Some(path),
            ExtractOutcome::Failure(_) => None,
        }
    }
}

/// Path the text rendering of `source` is written to.
pub fn output_path_for(source: &Path) -> PathBuf {
    source.with_extension("txt")
}

/// Extracts the text of each page of an in-memory PDF, in page order.
///
/// Page text is trimmed; pages without decodable text yield an empty string.
pub fn extract_pages(bytes: &[u8]) -> std::result::Result<Vec<String>, ExtractFailure> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| ExtractFailure::Corrupted(e.to_string()))?;

    let pages = doc
        .get_pages()
        .into_keys()
        .map(|page_number| match doc.extract_text(&[page_number]) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                debug!(page = page_number, error = %e, "page has no extractable text");
                String::new()
            }
        })
        .collect();

    Ok(pages)
}

/// Joins page texts, skipping empty pages and terminating each with
/// [`PAGE_SEPARATOR`].
pub fn render_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut out = String::new();
    for page in pages {
        let text = page.as_ref();
        if text.is_empty() {
            continue;
        }
        out.push_str(text);
        out.push_str(PAGE_SEPARATOR);
    }
    out
}

/// Extracts `path` into a sibling `.txt` file.
///
/// Missing and unparseable documents are reported as
/// [`ExtractOutcome::Failure`] without writing anything. Read errors other
/// than absence, and failure to write the output, are returned as errors.
pub fn extract_text_file(path: &Path) -> Result<ExtractOutcome> {
    if !path.is_file() {
        return Ok(ExtractOutcome::Failure(ExtractFailure::NotFound(
            path.to_path_buf(),
        )));
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(ExtractOutcome::Failure(ExtractFailure::NotFound(
                path.to_path_buf(),
            )))
        }
        Err(e) => return Err(PaperError::io(path, e)),
    };

    let pages = match extract_pages(&bytes) {
        Ok(pages) => pages,
        Err(failure) => {
            warn!(path = %path.display(), %failure, "extraction failed");
            return Ok(ExtractOutcome::Failure(failure));
        }
    };

    let text = render_pages(pages.as_slice());
    let output = output_path_for(path);
    fs::write(&output, &text).map_err(|e| PaperError::io(&output, e))?;

    info!(
        path = %path.display(),
        pages = pages.len(),
        output = %output.display(),
        bytes = text.len(),
        "text extraction complete"
    );
    Ok(ExtractOutcome::Success(output))
}

/// CLI entry point: prints the output path, or exits non-zero on failure.
pub fn run_extract(path: &Path) -> AnyResult<()> {
    match extract_text_file(path)? {
        ExtractOutcome::Success(output) => {
            println!("{}", output.display());
            Ok(())
        }
        ExtractOutcome::Failure(failure) => {
            eprintln!("Error: {}", failure);
            std::process::exit(1);
        }
    }
}
