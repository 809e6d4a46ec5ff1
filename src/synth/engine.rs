use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, warn};
use shlex::Shlex;

use super::{SpeechConfig, SynthError};

/// Override for the engine command line, shell-split. The program it names
/// must accept espeak-style flags (`-s`, `-a`, `-v`, `-w`, `--stdin`).
pub const TTS_COMMAND_ENV: &str = "NARRATOR_TTS_COMMAND";

const DEFAULT_ENGINE: &str = "espeak-ng";

/// Seam between synthesis orchestration and the engine process, so tests
/// can substitute a scripted stand-in.
pub trait TtsInvoker {
    fn synthesize(
        &self,
        text: &str,
        wav_out: &Path,
        config: &SpeechConfig,
    ) -> Result<(), SynthError>;
}

pub struct SubprocessEngine {
    command: Vec<String>,
}

impl SubprocessEngine {
    pub fn from_env() -> Self {
        if let Some(raw) = std::env::var_os(TTS_COMMAND_ENV) {
            let raw = raw.to_string_lossy().into_owned();
            let parts: Vec<String> = Shlex::new(&raw).collect();
            if !parts.is_empty() {
                return Self { command: parts };
            }
            warn!("{TTS_COMMAND_ENV} is set but empty; using {DEFAULT_ENGINE}");
        }
        Self {
            command: vec![DEFAULT_ENGINE.to_string()],
        }
    }

    pub(super) fn voice_listing_output(&self) -> Result<String, SynthError> {
        let mut command = Command::new(&self.command[0]);
        command.args(&self.command[1..]).arg("--voices");

        let output = command.output().map_err(SynthError::Spawn)?;
        if !output.status.success() {
            return Err(SynthError::Engine {
                status: output.status.code().unwrap_or_default(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn build_command(&self, wav_out: &Path, config: &SpeechConfig) -> Command {
        let mut command = Command::new(&self.command[0]);
        command.args(&self.command[1..]);
        command.arg("-s").arg(config.rate().to_string());
        command.arg("-a").arg(config.amplitude().to_string());
        if let Some(voice) = config.voice() {
            command.arg("-v").arg(voice);
        }
        command.arg("-w").arg(wav_out);
        command.arg("--stdin");
        command
    }
}

impl TtsInvoker for SubprocessEngine {
    fn synthesize(
        &self,
        text: &str,
        wav_out: &Path,
        config: &SpeechConfig,
    ) -> Result<(), SynthError> {
        debug!(
            "invoking {} (rate {}, amplitude {}, voice {:?})",
            self.command[0],
            config.rate(),
            config.amplitude(),
            config.voice()
        );

        let mut child = self
            .build_command(wav_out, config)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SynthError::Spawn)?;

        {
            let stdin = child.stdin.as_mut().ok_or_else(|| {
                SynthError::Spawn(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "engine stdin unavailable",
                ))
            })?;
            if let Err(err) = stdin.write_all(text.as_bytes()) {
                // An engine that rejects its arguments exits before reading
                // stdin; the exit status below carries the real failure.
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(err.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(SynthError::Engine {
                status: output.status.code().unwrap_or_default(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
