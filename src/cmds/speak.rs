use std::path::{Path, PathBuf};

use log::{info, warn};

use super::CommandError;
use crate::pages::{self, PageSpec};
use crate::pdf::{self, PdfSource};
use crate::synth::{self, SpeechConfig};

/// Narrate a whole document into a single audio file.
pub fn speak_document(
    source: &PdfSource,
    output: &Path,
    config: &SpeechConfig,
) -> Result<(), CommandError> {
    speak_selected(source, None, output, config)
}

/// Narrate the selected pages, in ascending page order, into one file.
pub fn speak_selected(
    source: &PdfSource,
    selection: Option<&PageSpec>,
    output: &Path,
    config: &SpeechConfig,
) -> Result<(), CommandError> {
    let pages = pdf::extract_pages(source)?;
    pdf::require_text(&pages)?;
    let selected = pages::resolve(selection, pages.len())?;

    info!(
        "narrating {} of {} pages from {} into {}",
        selected.len(),
        pages.len(),
        source.describe(),
        output.display()
    );
    let text = join_pages(&pages, &selected);
    synth::synthesize(&text, output, config)?;
    Ok(())
}

/// Narrate each page into its own `{prefix}{n}.{extension}` file, numbered
/// from 1. Pages without text are skipped, not synthesized as silence.
pub fn split_by_page(
    source: &PdfSource,
    prefix: &str,
    extension: &str,
    config: &SpeechConfig,
) -> Result<Vec<PathBuf>, CommandError> {
    let pages = pdf::extract_pages(source)?;
    pdf::require_text(&pages)?;

    let mut written = Vec::new();
    for (index, text) in pages.iter().enumerate() {
        let number = index + 1;
        if text.is_empty() {
            warn!("page {number} has no text, skipping");
            continue;
        }
        let target = PathBuf::from(format!("{prefix}{number}.{extension}"));
        synth::synthesize(text, &target, config)?;
        written.push(target);
    }
    info!("wrote {} page files from {}", written.len(), source.describe());
    Ok(written)
}

/// Narrate free text supplied on the command line.
pub fn speak_text(text: &str, output: &Path, config: &SpeechConfig) -> Result<(), CommandError> {
    synth::synthesize(text, output, config)?;
    info!("narrated {} characters into {}", text.len(), output.display());
    Ok(())
}

fn join_pages(pages: &[String], selected: &[usize]) -> String {
    let texts: Vec<&str> = selected
        .iter()
        .map(|&number| pages[number - 1].as_str())
        .filter(|text| !text.is_empty())
        .collect();
    texts.join(" ")
}
