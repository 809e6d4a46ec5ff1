use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::error;

mod audio;
mod cmds;
mod pages;
mod pdf;
mod synth;
mod util;

use pages::PageSpec;
use pdf::PdfSource;
use synth::SpeechConfig;

#[derive(Debug, Parser)]
#[command(name = "narrator", version, about = "Read PDF documents aloud")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Narrate a PDF document into an audio file.
    Speak {
        /// Path to the document, or `-` to read it from stdin.
        input: String,
        /// Output audio file; non-wav extensions are transcoded with ffmpeg.
        #[arg(short, long, default_value = "story.wav")]
        output: PathBuf,
        /// Pages to read, e.g. `1-4,7`. Reads everything when omitted.
        #[arg(long)]
        pages: Option<String>,
        /// Write one file per page instead of a single file.
        #[arg(long)]
        split: bool,
        /// Filename prefix for `--split` output.
        #[arg(long, default_value = "page_")]
        prefix: String,
        #[command(flatten)]
        speech: SpeechArgs,
    },
    /// Narrate free text given on the command line.
    Say {
        text: String,
        #[arg(short, long, default_value = "speech.wav")]
        output: PathBuf,
        #[command(flatten)]
        speech: SpeechArgs,
    },
    /// Play an audio file and wait for it to finish.
    Play { audio: PathBuf },
    /// Extract the document text to a UTF-8 file.
    ExportText {
        /// Path to the document, or `-` to read it from stdin.
        input: String,
        #[arg(short, long, default_value = "book.txt")]
        output: PathBuf,
    },
    /// Show the document information dictionary.
    Metadata {
        /// Path to the document, or `-` to read it from stdin.
        input: String,
        #[arg(long)]
        json: bool,
    },
    /// List the voices the speech engine offers.
    Voices {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct SpeechArgs {
    /// Speaking rate in words per minute, clamped to 60..=450.
    #[arg(long, default_value_t = 150)]
    rate: u32,
    /// Volume between 0.0 and 1.0.
    #[arg(long, default_value_t = 1.0)]
    volume: f32,
    /// Engine voice identifier. A voice the engine rejects falls back to
    /// the default voice with a warning.
    #[arg(long)]
    voice: Option<String>,
}

impl SpeechArgs {
    fn config(&self) -> SpeechConfig {
        SpeechConfig::new(self.rate, self.volume, self.voice.clone())
    }
}

/// `-` means "the document arrives on stdin", any other value is a path.
fn source_from_arg(input: &str) -> anyhow::Result<PdfSource> {
    if input == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("reading document from stdin")?;
        Ok(PdfSource::Bytes(bytes))
    } else {
        Ok(PdfSource::Path(PathBuf::from(input)))
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Speak {
            input,
            output,
            pages,
            split,
            prefix,
            speech,
        } => {
            let source = source_from_arg(&input)?;
            let config = speech.config();
            if split {
                let extension = output
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .unwrap_or("wav")
                    .to_string();
                cmds::split_by_page(&source, &prefix, &extension, &config)?;
            } else {
                let selection = pages.as_deref().map(PageSpec::from);
                cmds::speak_selected(&source, selection.as_ref(), &output, &config)?;
            }
        }
        Command::Say {
            text,
            output,
            speech,
        } => {
            cmds::speak_text(&text, &output, &speech.config())?;
        }
        Command::Play { audio } => {
            cmds::play(&audio)?;
        }
        Command::ExportText { input, output } => {
            let source = source_from_arg(&input)?;
            cmds::export_text(&source, &output)?;
        }
        Command::Metadata { input, json } => {
            let source = source_from_arg(&input)?;
            println!("{}", cmds::metadata(&source, json)?);
        }
        Command::Voices { json } => {
            println!("{}", cmds::voices(json)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    util::logging::init();
    if let Err(err) = run(Cli::parse()) {
        error!("{err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
