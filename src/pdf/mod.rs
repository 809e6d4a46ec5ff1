//! Text extraction over `lopdf`.
//!
//! Turns a PDF document, read from disk or from an in-memory buffer, into
//! one whitespace-normalized string per page. Pages without extractable
//! text yield empty strings so the sequence length always matches the
//! document's page count.

mod meta;

pub use meta::{read_metadata, PdfMetadata};

use std::path::PathBuf;

use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("document not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("failed to parse document: {0}")]
    Parse(String),
    #[error("document contains no extractable text")]
    NoText,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where the PDF bytes come from for one invocation.
#[derive(Debug, Clone)]
pub enum PdfSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl PdfSource {
    pub fn describe(&self) -> String {
        match self {
            PdfSource::Path(path) => path.display().to_string(),
            PdfSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }

    fn open(&self) -> Result<Document, PdfError> {
        match self {
            PdfSource::Path(path) => {
                if !path.exists() {
                    return Err(PdfError::SourceNotFound(path.clone()));
                }
                Document::load(path).map_err(|err| PdfError::Parse(err.to_string()))
            }
            PdfSource::Bytes(bytes) => {
                Document::load_mem(bytes).map_err(|err| PdfError::Parse(err.to_string()))
            }
        }
    }
}

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid pattern"));

/// Collapse every whitespace run, including newlines, to a single space.
fn normalize(raw: &str) -> String {
    WHITESPACE_RUNS.replace_all(raw, " ").trim().to_string()
}

/// Extract per-page text, in page order.
pub fn extract_pages(source: &PdfSource) -> Result<Vec<String>, PdfError> {
    let doc = source.open()?;
    let mut pages = Vec::new();
    for (number, _object_id) in doc.get_pages() {
        let text = match doc.extract_text(&[number]) {
            Ok(raw) => normalize(&raw),
            Err(err) => {
                log::debug!("no text on page {number}: {err}");
                String::new()
            }
        };
        pages.push(text);
    }
    Ok(pages)
}

/// Reject page sequences with nothing worth reading aloud.
pub fn require_text(pages: &[String]) -> Result<(), PdfError> {
    if pages.iter().all(|page| page.is_empty()) {
        return Err(PdfError::NoText);
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Build an uncompressed single-font PDF with one page per entry.
    pub fn document(pages: &[&str]) -> Document {
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
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    pub fn bytes(pages: &[&str]) -> Vec<u8> {
        let mut buffer = Vec::new();
        document(pages)
            .save_to(&mut buffer)
            .expect("fixture document serializes");
        buffer
    }
}
