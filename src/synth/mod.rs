//! Speech synthesis over a subprocess text-to-speech engine.
//!
//! The default engine is `espeak-ng`; set `NARRATOR_TTS_COMMAND` to swap in
//! any program that accepts the same flags. WAV output comes straight from
//! the engine, other extensions are transcoded with ffmpeg afterwards.

mod engine;
pub mod voices;

pub use engine::{SubprocessEngine, TtsInvoker, TTS_COMMAND_ENV};

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{info, warn};
use thiserror::Error;

pub const FFMPEG_PATH_ENV: &str = "NARRATOR_FFMPEG_PATH";

pub const MIN_RATE: u32 = 60;
pub const MAX_RATE: u32 = 450;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("nothing to synthesize: the supplied text is empty")]
    EmptyInput,
    #[error("failed to launch the speech engine: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("speech engine exited with status {status}: {stderr}")]
    Engine { status: i32, stderr: String },
    #[error("speech engine reported success but {0} is missing or empty")]
    NoOutput(PathBuf),
    #[error("ffmpeg is required for .{0} output but is not available; install it or set {FFMPEG_PATH_ENV}")]
    FfmpegMissing(String),
    #[error("ffmpeg failed to encode {0}: {1}")]
    Encode(PathBuf, String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Validated synthesis settings. Clamping happens once, at construction,
/// so every consumer sees in-range values.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    rate: u32,
    volume: f32,
    voice: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: 150,
            volume: 1.0,
            voice: None,
        }
    }
}

impl SpeechConfig {
    pub fn new(rate: u32, volume: f32, voice: Option<String>) -> Self {
        Self {
            rate: rate.clamp(MIN_RATE, MAX_RATE),
            volume: volume.clamp(0.0, 1.0),
            voice: voice.filter(|v| !v.trim().is_empty()),
        }
    }

    /// Words per minute, within `[60, 450]`.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Output volume, within `[0.0, 1.0]`.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    /// Engine amplitude: 100 is the engine default, so full volume maps
    /// onto it.
    pub fn amplitude(&self) -> u32 {
        (self.volume * 100.0).round() as u32
    }

    fn without_voice(&self) -> Self {
        Self {
            voice: None,
            ..self.clone()
        }
    }
}

/// Synthesize `text` into `output` using the engine resolved from the
/// environment. Blocking; the engine subprocess is spawned and reaped
/// within this call.
pub fn synthesize(text: &str, output: &Path, config: &SpeechConfig) -> Result<(), SynthError> {
    synthesize_with(&SubprocessEngine::from_env(), text, output, config)
}

pub fn synthesize_with(
    engine: &dyn TtsInvoker,
    text: &str,
    output: &Path,
    config: &SpeechConfig,
) -> Result<(), SynthError> {
    if text.trim().is_empty() {
        return Err(SynthError::EmptyInput);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match output_extension(output) {
        None => run_engine(engine, text, output, config)?,
        Some(format) => {
            let staging = tempfile::tempdir()?;
            let wav = staging.path().join("synth.wav");
            run_engine(engine, text, &wav, config)?;
            encode_wav(&wav, output, &format)?;
        }
    }

    let non_empty = fs::metadata(output).map(|meta| meta.len() > 0).unwrap_or(false);
    if !non_empty {
        return Err(SynthError::NoOutput(output.to_path_buf()));
    }
    Ok(())
}

/// `None` means the engine can write the file directly.
fn output_extension(output: &Path) -> Option<String> {
    let ext = output
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_lowercase)?;
    if ext == "wav" {
        None
    } else {
        Some(ext)
    }
}

fn run_engine(
    engine: &dyn TtsInvoker,
    text: &str,
    wav_out: &Path,
    config: &SpeechConfig,
) -> Result<(), SynthError> {
    match engine.synthesize(text, wav_out, config) {
        Err(SynthError::Engine { status, stderr }) if config.voice().is_some() => {
            let voice = config.voice().unwrap_or_default();
            warn!(
                "engine rejected voice '{voice}' (status {status}: {stderr}); retrying with the default voice"
            );
            engine.synthesize(text, wav_out, &config.without_voice())
        }
        result => result,
    }
}

fn locate_ffmpeg() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(FFMPEG_PATH_ENV) {
        let candidate = PathBuf::from(path);
        if candidate.exists() {
            return Some(candidate);
        }
        warn!("{FFMPEG_PATH_ENV} points at a missing file; searching PATH instead");
    }
    which::which("ffmpeg").ok()
}

fn encode_wav(source: &Path, target: &Path, format: &str) -> Result<(), SynthError> {
    let ffmpeg = locate_ffmpeg().ok_or_else(|| SynthError::FfmpegMissing(format.to_string()))?;
    info!("encoding {} with ffmpeg", target.display());

    let output = Command::new(ffmpeg)
        .arg("-y")
        .arg("-i")
        .arg(source)
        .arg("-vn")
        .arg(target)
        .output()
        .map_err(|err| SynthError::Encode(target.to_path_buf(), err.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(SynthError::Encode(target.to_path_buf(), stderr));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod stubs {
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::PathBuf;

    use assert_fs::TempDir;

    use super::TTS_COMMAND_ENV;

    pub struct EnvGuard {
        key: &'static str,
        previous: Option<std::ffi::OsString>,
    }

    impl EnvGuard {
        pub fn set(key: &'static str, value: &str) -> Self {
            let previous = std::env::var_os(key);
            std::env::set_var(key, value);
            Self { key, previous }
        }

        pub fn unset(key: &'static str) -> Self {
            let previous = std::env::var_os(key);
            std::env::remove_var(key);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    pub fn write_script(temp: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = temp.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).unwrap();
        }
        path
    }

    /// A stand-in engine that copies its stdin text into the `-w` target,
    /// so tests can assert on what would have been spoken.
    pub fn echo_engine(temp: &TempDir) -> EnvGuard {
        let script = write_script(
            temp,
            "mock_tts.sh",
            r#"#!/bin/sh
out=""
while [ "$1" != "" ]; do
  if [ "$1" = "-w" ]; then
    shift
    out="$1"
  fi
  shift
done
/bin/cat - > "$out"
"#,
        );
        EnvGuard::set(TTS_COMMAND_ENV, &script.to_string_lossy())
    }

    /// An engine that fails whenever a voice is requested, to exercise the
    /// default-voice fallback.
    pub fn voiceless_engine(temp: &TempDir) -> EnvGuard {
        let script = write_script(
            temp,
            "picky_tts.sh",
            r#"#!/bin/sh
out=""
voice=""
while [ "$1" != "" ]; do
  if [ "$1" = "-w" ]; then
    shift
    out="$1"
  fi
  if [ "$1" = "-v" ]; then
    shift
    voice="$1"
  fi
  shift
done
if [ "$voice" != "" ]; then
  echo "unknown voice: $voice" >&2
  exit 1
fi
/bin/cat - > "$out"
"#,
        );
        EnvGuard::set(TTS_COMMAND_ENV, &script.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::stubs::{echo_engine, voiceless_engine, EnvGuard};
    use super::*;
    use assert_fs::TempDir;
    use serial_test::serial;

    #[test]
    fn config_clamps_out_of_range_values() {
        let config = SpeechConfig::new(1000, -1.0, None);
        assert_eq!(config.rate(), 450);
        assert_eq!(config.volume(), 0.0);

        let config = SpeechConfig::new(10, 7.5, None);
        assert_eq!(config.rate(), 60);
        assert_eq!(config.volume(), 1.0);
    }

    #[test]
    fn config_amplitude_scales_volume() {
        assert_eq!(SpeechConfig::new(150, 1.0, None).amplitude(), 100);
        assert_eq!(SpeechConfig::new(150, 0.25, None).amplitude(), 25);
    }

    #[test]
    fn blank_voice_is_treated_as_unset() {
        assert_eq!(SpeechConfig::new(150, 1.0, Some("  ".into())).voice(), None);
    }

    #[test]
    #[serial]
    fn empty_text_is_rejected_before_the_engine_runs() {
        let temp = TempDir::new().unwrap();
        let _engine = echo_engine(&temp);
        let out = temp.path().join("speech.wav");

        let err = synthesize("   \n", &out, &SpeechConfig::default()).unwrap_err();
        assert!(matches!(err, SynthError::EmptyInput));
        assert!(!out.exists());
    }

    #[test]
    #[serial]
    fn wav_output_contains_engine_audio() {
        let temp = TempDir::new().unwrap();
        let _engine = echo_engine(&temp);
        let out = temp.path().join("speech.wav");

        synthesize("hello there", &out, &SpeechConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hello there");
    }

    #[test]
    #[serial]
    fn unknown_voice_falls_back_to_the_default() {
        let temp = TempDir::new().unwrap();
        let _engine = voiceless_engine(&temp);
        let out = temp.path().join("speech.wav");

        let config = SpeechConfig::new(150, 1.0, Some("martian".into()));
        synthesize("still audible", &out, &config).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "still audible");
    }

    #[test]
    #[serial]
    fn engine_failure_without_voice_is_reported() {
        let temp = TempDir::new().unwrap();
        let script = stubs::write_script(
            &temp,
            "broken_tts.sh",
            "#!/bin/sh\necho boom >&2\nexit 3\n",
        );
        let _engine = EnvGuard::set(TTS_COMMAND_ENV, &script.to_string_lossy());
        let out = temp.path().join("speech.wav");

        let err = synthesize("text", &out, &SpeechConfig::default()).unwrap_err();
        match err {
            SynthError::Engine { status, stderr } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn non_wav_output_reports_missing_ffmpeg() {
        let temp = TempDir::new().unwrap();
        let _engine = echo_engine(&temp);
        let _no_ffmpeg = EnvGuard::set(FFMPEG_PATH_ENV, "/nonexistent/ffmpeg");
        let _no_path = EnvGuard::set("PATH", temp.path().to_string_lossy().as_ref());
        let out = temp.path().join("speech.mp3");

        let err = synthesize("text", &out, &SpeechConfig::default()).unwrap_err();
        assert!(matches!(err, SynthError::FfmpegMissing(ref ext) if ext == "mp3"));
    }

    #[test]
    #[serial]
    fn non_wav_output_is_transcoded_through_ffmpeg() {
        let temp = TempDir::new().unwrap();
        let _engine = echo_engine(&temp);
        let ffmpeg = stubs::write_script(
            &temp,
            "ffmpeg",
            r#"#!/bin/sh
in=""
while [ "$1" != "" ]; do
  if [ "$1" = "-i" ]; then
    shift
    in="$1"
  fi
  out="$1"
  shift
done
/bin/cat "$in" > "$out"
"#,
        );
        let _ffmpeg = EnvGuard::set(FFMPEG_PATH_ENV, &ffmpeg.to_string_lossy());
        let out = temp.path().join("speech.mp3");

        synthesize("compressed words", &out, &SpeechConfig::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "compressed words");
    }
}
