use super::CommandError;
use crate::synth::voices::{list_voices, VoiceInfo};

/// Render the engine's voice listing for display.
pub fn voices(json: bool) -> Result<String, CommandError> {
    render(&list_voices()?, json)
}

fn render(voices: &[VoiceInfo], json: bool) -> Result<String, CommandError> {
    if json {
        return Ok(serde_json::to_string_pretty(voices)?);
    }
    let mut lines = vec![format!(
        "{:<12} {:<32} {:<8} {}",
        "ID", "NAME", "GENDER", "AGE"
    )];
    for voice in voices {
        lines.push(format!(
            "{:<12} {:<32} {:<8} {}",
            voice.id,
            voice.name,
            voice.gender.as_deref().unwrap_or("-"),
            voice.age.as_deref().unwrap_or("-"),
        ));
    }
    Ok(lines.join("\n"))
}
