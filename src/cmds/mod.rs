//! Orchestration of the pipeline stages behind each CLI subcommand.
//!
//! Every function here is synchronous and single-shot: it runs the stages
//! it needs, stops at the first failure, and hands the typed error back to
//! `main` for reporting.

mod export;
mod play;
mod speak;
mod voices;

pub use export::{export_text, metadata};
pub use play::play;
pub use speak::{speak_document, speak_selected, speak_text, split_by_page};
pub use voices::voices;

use thiserror::Error;

use crate::audio::AudioError;
use crate::pages::SelectionError;
use crate::pdf::PdfError;
use crate::synth::SynthError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Synth(#[from] SynthError),
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
