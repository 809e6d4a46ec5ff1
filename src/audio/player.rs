use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use rodio::{Decoder, OutputStream, Sink};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("could not open audio file: {0}")]
    Io(String),
    #[error("audio file is corrupt: {0}")]
    Decode(String),
    #[error("no playback device available")]
    Device,
}

/// Play a file on the default output device, returning once it finishes.
///
/// The file is opened and decoded before any device is acquired, so a
/// missing or corrupt file fails even on machines without audio hardware.
pub fn play_blocking(path: &Path) -> Result<(), AudioError> {
    let file = File::open(path).map_err(|err| AudioError::Io(err.to_string()))?;
    let decoder =
        Decoder::new(BufReader::new(file)).map_err(|err| AudioError::Decode(err.to_string()))?;

    debug!("playing {}", path.display());
    let (_stream, handle) = OutputStream::try_default().map_err(|_| AudioError::Device)?;
    let sink = Sink::try_new(&handle).map_err(|_| AudioError::Device)?;
    sink.append(decoder);
    sink.sleep_until_end();
    Ok(())
}
