// voice/synth.rs - Host speech and sound capabilities

use super::types::{Utterance, Voice, VoiceError};
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;

/// Text-to-speech backend. `speak` resolves once the utterance has finished;
/// dropping the future cancels it.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn voices(&self) -> Result<Vec<Voice>, VoiceError>;

    async fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError>;

    fn name(&self) -> &str;
}

/// One-shot notification sound.
#[async_trait]
pub trait Chime: Send + Sync {
    async fn play(&self) -> Result<(), VoiceError>;
}

/// Silent synthesizer for headless hosts.
pub struct NoopSynthesizer;

#[async_trait]
impl SpeechSynthesizer for NoopSynthesizer {
    async fn voices(&self) -> Result<Vec<Voice>, VoiceError> {
        Ok(Vec::new())
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
        tracing::debug!("(silent) {}", utterance.text);
        Ok(())
    }

    fn name(&self) -> &str {
        "none"
    }
}

pub struct NoopChime;

#[async_trait]
impl Chime for NoopChime {
    async fn play(&self) -> Result<(), VoiceError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TtsProgram {
    Espeak,
    Say,
}

/// Drives `espeak-ng` (Linux) or `say` (macOS) as a child process.
pub struct CommandSynthesizer {
    program: TtsProgram,
}

impl CommandSynthesizer {
    pub fn espeak() -> Self {
        Self {
            program: TtsProgram::Espeak,
        }
    }

    pub fn say() -> Self {
        Self {
            program: TtsProgram::Say,
        }
    }

    fn speak_command(&self, utterance: &Utterance) -> Command {
        let params = &utterance.params;
        let mut cmd = match self.program {
            TtsProgram::Espeak => {
                let voice = params
                    .voice_id
                    .clone()
                    .unwrap_or_else(|| params.lang.to_ascii_lowercase());
                let mut cmd = Command::new("espeak-ng");
                cmd.arg("-v")
                    .arg(voice)
                    .arg("-s")
                    .arg(words_per_minute(params.rate).to_string())
                    .arg("-p")
                    .arg(((params.pitch * 50.0).round() as i32).clamp(0, 99).to_string())
                    .arg("-a")
                    .arg(((params.volume * 100.0).round() as i32).clamp(0, 200).to_string());
                cmd
            }
            TtsProgram::Say => {
                let mut cmd = Command::new("say");
                if let Some(voice) = &params.voice_id {
                    cmd.arg("-v").arg(voice);
                }
                cmd.arg("-r").arg(words_per_minute(params.rate).to_string());
                cmd
            }
        };
        cmd.arg(&utterance.text);
        cmd
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn voices(&self) -> Result<Vec<Voice>, VoiceError> {
        let mut cmd = match self.program {
            TtsProgram::Espeak => {
                let mut cmd = Command::new("espeak-ng");
                cmd.arg("--voices");
                cmd
            }
            TtsProgram::Say => {
                let mut cmd = Command::new("say");
                cmd.arg("-v").arg("?");
                cmd
            }
        };

        let output = cmd
            .kill_on_drop(true)
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| VoiceError::Unavailable(format!("{}: {}", self.name(), e)))?;

        if !output.status.success() {
            return Err(VoiceError::CommandFailed(format!(
                "{} voice listing exited with {}",
                self.name(),
                output.status
            )));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(match self.program {
            TtsProgram::Espeak => parse_espeak_voices(&listing),
            TtsProgram::Say => parse_say_voices(&listing),
        })
    }

    async fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
        run_to_completion(self.speak_command(utterance), self.name()).await
    }

    fn name(&self) -> &str {
        match self.program {
            TtsProgram::Espeak => "espeak-ng",
            TtsProgram::Say => "say",
        }
    }
}

/// Plays a sound file with the platform's command-line player.
pub struct CommandChime {
    path: PathBuf,
}

impl CommandChime {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Chime for CommandChime {
    async fn play(&self) -> Result<(), VoiceError> {
        let player = if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "paplay"
        };
        let mut cmd = Command::new(player);
        cmd.arg(&self.path);
        run_to_completion(cmd, player).await
    }
}

async fn run_to_completion(mut cmd: Command, label: &str) -> Result<(), VoiceError> {
    let status = cmd
        .kill_on_drop(true)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| VoiceError::Unavailable(format!("{}: {}", label, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(VoiceError::CommandFailed(format!("{} exited with {}", label, status)))
    }
}

fn words_per_minute(rate: f32) -> u32 {
    (175.0 * rate.clamp(0.1, 4.0)).round() as u32
}

/// Parse `espeak-ng --voices`:
/// `Pty Language Age/Gender VoiceName File Other Languages`
fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _priority = cols.next()?;
            let lang = cols.next()?;
            Some(Voice {
                id: lang.to_string(),
                lang: canonical_lang(lang),
            })
        })
        .collect()
}

fn say_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.+?)\s{2,}(?P<lang>[A-Za-z]{2,3}[_-][A-Za-z0-9]+)\s+#")
            .expect("say voice regex")
    })
}

/// Parse `say -v ?`: `Samantha            en_US    # Hello! My name is Samantha.`
fn parse_say_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter_map(|line| {
            let caps = say_line().captures(line)?;
            Some(Voice {
                id: caps["name"].trim().to_string(),
                lang: canonical_lang(&caps["lang"]),
            })
        })
        .collect()
}

/// "en_us" / "en-us" -> "en-US"
fn canonical_lang(raw: &str) -> String {
    let normalized = raw.replace('_', "-");
    match normalized.split_once('-') {
        Some((lang, region)) if region.len() == 2 => {
            format!("{}-{}", lang.to_ascii_lowercase(), region.to_ascii_uppercase())
        }
        _ => normalized,
    }
}
