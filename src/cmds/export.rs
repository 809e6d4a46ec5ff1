use std::fs;
use std::path::Path;

use log::info;

use super::CommandError;
use crate::pdf::{self, PdfMetadata, PdfSource};

/// Write the document's text to a UTF-8 file, pages separated by a blank
/// line.
pub fn export_text(source: &PdfSource, output: &Path) -> Result<(), CommandError> {
    let pages = pdf::extract_pages(source)?;
    pdf::require_text(&pages)?;

    let mut text = pages.join("\n\n");
    text.push('\n');
    fs::write(output, text)?;
    info!(
        "exported {} pages from {} to {}",
        pages.len(),
        source.describe(),
        output.display()
    );
    Ok(())
}

/// Render the document information dictionary for display.
pub fn metadata(source: &PdfSource, json: bool) -> Result<String, CommandError> {
    let metadata = pdf::read_metadata(source)?;
    render_metadata(&metadata, json)
}

fn render_metadata(metadata: &PdfMetadata, json: bool) -> Result<String, CommandError> {
    if json {
        return Ok(serde_json::to_string_pretty(metadata)?);
    }
    if metadata.is_empty() {
        return Ok("no metadata".to_string());
    }
    let lines: Vec<String> = metadata
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect();
    Ok(lines.join("\n"))
}
