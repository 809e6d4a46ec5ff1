//! Voice discovery through the engine's own listing.

use log::debug;
use serde::Serialize;

use super::{SubprocessEngine, SynthError};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Identifier accepted by the engine's voice flag.
    pub id: String,
    /// Human-readable voice name.
    pub name: String,
    pub language: String,
    pub gender: Option<String>,
    pub age: Option<String>,
}

/// List the voices the engine reports, sorted by language then name.
pub fn list_voices() -> Result<Vec<VoiceInfo>, SynthError> {
    let engine = SubprocessEngine::from_env();
    let output = engine.voice_listing_output()?;
    Ok(parse_voice_table(&output))
}

/// Parse espeak's tabular listing:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
///
/// Lines that do not fit the shape are skipped, not fatal.
fn parse_voice_table(output: &str) -> Vec<VoiceInfo> {
    let mut voices: Vec<VoiceInfo> = output
        .lines()
        .skip(1)
        .filter_map(parse_voice_line)
        .collect();
    voices.sort_by(|a, b| (&a.language, &a.name).cmp(&(&b.language, &b.name)));
    voices
}

fn parse_voice_line(line: &str) -> Option<VoiceInfo> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        if !line.trim().is_empty() {
            debug!("skipping unparsable voice line: {line:?}");
        }
        return None;
    }

    let language = fields[1].to_string();
    let (age, gender) = parse_age_gender(fields[2]);
    Some(VoiceInfo {
        id: language.clone(),
        name: fields[3].to_string(),
        language,
        gender,
        age,
    })
}

fn parse_age_gender(field: &str) -> (Option<String>, Option<String>) {
    let Some((age, gender)) = field.split_once('/') else {
        return (None, None);
    };
    let present = |part: &str| {
        let part = part.trim();
        if part.is_empty() || part.chars().all(|ch| ch == '-') {
            None
        } else {
            Some(part.to_string())
        }
    };
    (present(age), present(gender))
}
