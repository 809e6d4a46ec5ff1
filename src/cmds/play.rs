use std::path::Path;

use log::info;

use super::CommandError;
use crate::audio;

/// Play an existing audio file, blocking until it finishes.
pub fn play(path: &Path) -> Result<(), CommandError> {
    info!("playing {}", path.display());
    audio::play_blocking(path)?;
    Ok(())
}
