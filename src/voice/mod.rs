pub mod script;
pub mod synth;
pub mod types;
pub mod voices;

pub use synth::{Chime, CommandChime, CommandSynthesizer, NoopChime, NoopSynthesizer, SpeechSynthesizer};
pub use types::{PlayMode, Utterance, Voice, VoiceError, VoiceParams};

use crate::settings::{Settings, TtsBackend};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

const UTTERANCE_GAP: Duration = Duration::from_millis(800);

/// Sequences utterances through a [`SpeechSynthesizer`]. Each `play` call runs
/// in its own task; a shared gate keeps sequences from talking over each other.
pub struct VoicePlayer {
    synth: Arc<dyn SpeechSynthesizer>,
    chime: Arc<dyn Chime>,
    gate: Arc<TokioMutex<()>>,
    sequences: Mutex<Vec<JoinHandle<()>>>,
    catalog: TokioMutex<Vec<Voice>>,
    gap: Duration,
}

impl VoicePlayer {
    pub fn new(synth: Arc<dyn SpeechSynthesizer>, chime: Arc<dyn Chime>) -> Self {
        Self {
            synth,
            chime,
            gate: Arc::new(TokioMutex::new(())),
            sequences: Mutex::new(Vec::new()),
            catalog: TokioMutex::new(Vec::new()),
            gap: UTTERANCE_GAP,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let synth: Arc<dyn SpeechSynthesizer> = match settings.tts {
            TtsBackend::Espeak => Arc::new(CommandSynthesizer::espeak()),
            TtsBackend::Say => Arc::new(CommandSynthesizer::say()),
            TtsBackend::None => Arc::new(NoopSynthesizer),
        };
        let chime: Arc<dyn Chime> = match &settings.sound_path {
            Some(path) => Arc::new(CommandChime::new(path.clone())),
            None => Arc::new(NoopChime),
        };

        tracing::info!(
            "Voice: synthesizer={}, notification sound={}",
            synth.name(),
            settings.sound_path.is_some()
        );
        Self::new(synth, chime)
    }

    /// Pause inserted between consecutive utterances.
    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.gap = gap;
        self
    }

    /// Speak `lines` in order. Empty lines are skipped.
    pub fn play(&self, lines: Vec<String>, params: VoiceParams, mode: PlayMode) {
        let utterances: Vec<Utterance> = lines
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .map(|text| Utterance {
                text,
                params: params.clone(),
            })
            .collect();
        if utterances.is_empty() {
            return;
        }

        let Ok(mut sequences) = self.sequences.lock() else {
            return;
        };
        if mode == PlayMode::Restart {
            for handle in sequences.drain(..) {
                handle.abort();
            }
        }
        sequences.retain(|handle| !handle.is_finished());

        tracing::info!("Voice: queued {} utterances ({:?})", utterances.len(), mode);
        let handle = tokio::spawn(run_sequence(
            self.synth.clone(),
            self.gate.clone(),
            utterances,
            self.gap,
        ));
        sequences.push(handle);
    }

    /// Cancel every queued or playing sequence.
    pub fn stop(&self) {
        if let Ok(mut sequences) = self.sequences.lock() {
            let active = sequences.iter().filter(|h| !h.is_finished()).count();
            for handle in sequences.drain(..) {
                handle.abort();
            }
            if active > 0 {
                tracing::info!("Voice: stopped {} sequence(s)", active);
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.sequences
            .lock()
            .map(|sequences| sequences.iter().any(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Fire the notification sound without waiting for it.
    pub fn chime(&self) {
        let chime = self.chime.clone();
        tokio::spawn(async move {
            if let Err(e) = chime.play().await {
                tracing::warn!("Notification sound failed: {}", e);
            }
        });
    }

    /// Known voices. The host may report none until its voice list has loaded,
    /// so an empty cache (or `refresh`) queries the synthesizer again.
    pub async fn voices(&self, refresh: bool) -> Vec<Voice> {
        let mut catalog = self.catalog.lock().await;
        if refresh || catalog.is_empty() {
            match self.synth.voices().await {
                Ok(found) => {
                    *catalog = voices::rank(found);
                    tracing::info!("Voice: {} voices available", catalog.len());
                }
                Err(e) => tracing::warn!("Voice list unavailable: {}", e),
            }
        }
        catalog.clone()
    }
}

impl Drop for VoicePlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_sequence(
    synth: Arc<dyn SpeechSynthesizer>,
    gate: Arc<TokioMutex<()>>,
    utterances: Vec<Utterance>,
    gap: Duration,
) {
    let _turn = gate.lock().await;

    for (idx, utterance) in utterances.iter().enumerate() {
        if idx > 0 {
            sleep(gap).await;
        }
        if let Err(e) = synth.speak(utterance).await {
            tracing::warn!("Voice: '{}' failed: {}", synth.name(), e);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;

    /// Records spoken text after a fixed speaking time.
    pub struct RecordingSynth {
        pub spoken: Arc<Mutex<Vec<String>>>,
        pub speaking_time: Duration,
        pub voices: Vec<Voice>,
    }

    impl RecordingSynth {
        pub fn new(speaking_time: Duration) -> Self {
            Self {
                spoken: Arc::new(Mutex::new(Vec::new())),
                speaking_time,
                voices: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynth {
        async fn voices(&self) -> Result<Vec<Voice>, VoiceError> {
            Ok(self.voices.clone())
        }

        async fn speak(&self, utterance: &Utterance) -> Result<(), VoiceError> {
            sleep(self.speaking_time).await;
            self.spoken.lock().unwrap().push(utterance.text.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }
}
