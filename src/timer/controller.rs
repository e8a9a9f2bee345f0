// timer/controller.rs - Owns the countdown, its ticker and the completion flow

use super::progress::TimerSnapshot;
use super::session::Session;
use super::types::{StartOutcome, TickOutcome, TimerError, TimerState};
use crate::config::{self, KeyValueStore, Preferences, UpdatePreferencesPayload};
use crate::suggestions::{SuggestionEngine, SuggestionSet};
use crate::voice::{script, voices, PlayMode, Voice, VoiceParams, VoicePlayer};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex as TokioMutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};

const TICK_PERIOD: Duration = Duration::from_secs(1);
/// Gap between the notification sound and the spoken reminder.
const REMINDER_DELAY: Duration = Duration::from_millis(500);

/// Shared handle to the single timer. Cloning is cheap.
#[derive(Clone)]
pub struct TimerController {
    shared: Arc<Shared>,
}

struct Shared {
    state: TokioMutex<Inner>,
    store: Arc<dyn KeyValueStore>,
    suggestions: Arc<SuggestionEngine>,
    voice: Arc<VoicePlayer>,
}

struct Inner {
    session: Session,
    prefs: Preferences,
    suggestions: Option<SuggestionSet>,
    loading_suggestions: bool,
    ticker: Option<Ticker>,
}

impl Inner {
    fn clear_suggestions(&mut self) {
        self.suggestions = None;
        self.loading_suggestions = false;
    }

    fn voice_params(&self) -> VoiceParams {
        VoiceParams::with_voice(self.prefs.selected_voice.clone())
    }
}

/// One-second interval task. Aborted when dropped.
struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    fn spawn(shared: Weak<Shared>, session_id: String) -> Self {
        let handle = tokio::spawn(run_ticker(shared, session_id));
        Self {
            handle: Some(handle),
        }
    }

    /// Let the task run to the end on its own.
    fn detach(mut self) {
        self.handle.take();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// What the completion flow needs, captured while the lock is held.
struct Completion {
    session_id: String,
    task: String,
    duration_secs: u64,
    voice_enabled: bool,
    auto_play: bool,
    params: VoiceParams,
}

impl TimerController {
    pub fn new(
        prefs: Preferences,
        store: Arc<dyn KeyValueStore>,
        suggestions: Arc<SuggestionEngine>,
        voice: Arc<VoicePlayer>,
    ) -> Self {
        let session = Session::new(prefs.task.clone(), prefs.duration_seconds);
        tracing::info!(
            "Timer ready: duration={}s, task='{}'",
            session.duration_secs(),
            session.task()
        );

        Self {
            shared: Arc::new(Shared {
                state: TokioMutex::new(Inner {
                    session,
                    prefs,
                    suggestions: None,
                    loading_suggestions: false,
                    ticker: None,
                }),
                store,
                suggestions,
                voice,
            }),
        }
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.shared.suggestions
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        let inner = self.shared.state.lock().await;
        self.shared.snapshot(&inner)
    }

    pub async fn start(&self) -> (StartOutcome, TimerSnapshot) {
        let mut inner = self.shared.state.lock().await;
        let outcome = inner.session.start();

        match outcome {
            StartOutcome::Rejected(reason) => {
                tracing::warn!("Start rejected: {}", reason.warning());
            }
            StartOutcome::AlreadyRunning => {}
            StartOutcome::Started | StartOutcome::Resumed | StartOutcome::Restarted => {
                if outcome == StartOutcome::Restarted {
                    inner.clear_suggestions();
                    self.shared.voice.stop();
                }
                let session_id = inner.session.id().to_string();
                inner.ticker = Some(Ticker::spawn(Arc::downgrade(&self.shared), session_id));
                tracing::info!(
                    "Timer {:?}: '{}' {}s remaining",
                    outcome,
                    inner.session.task(),
                    inner.session.remaining_secs()
                );
            }
        }

        (outcome, self.shared.snapshot(&inner))
    }

    pub async fn pause(&self) -> TimerSnapshot {
        let mut inner = self.shared.state.lock().await;
        if inner.session.pause() {
            inner.ticker = None;
            tracing::info!("Timer paused at {}s", inner.session.remaining_secs());
        }
        self.shared.snapshot(&inner)
    }

    pub async fn reset(&self) -> TimerSnapshot {
        let mut inner = self.shared.state.lock().await;
        inner.ticker = None;
        inner.session.reset();
        inner.clear_suggestions();
        self.shared.voice.stop();

        tracing::info!("Timer reset to {}s", inner.session.duration_secs());
        self.shared.snapshot(&inner)
    }

    /// Returns whether the extra time was applied.
    pub async fn add_time(&self, minutes: u64) -> (bool, TimerSnapshot) {
        let mut inner = self.shared.state.lock().await;
        let applied = inner.session.add_time(minutes);

        if applied {
            inner.prefs.duration_seconds = inner.session.duration_secs();
            self.shared.persist(&inner.prefs);
            tracing::info!(
                "Added {} min, duration now {}s",
                minutes,
                inner.session.duration_secs()
            );
        }
        (applied, self.shared.snapshot(&inner))
    }

    pub async fn preferences(&self) -> Preferences {
        self.shared.state.lock().await.prefs.clone()
    }

    /// Apply a partial update. A duration change while running is refused
    /// and nothing else in the payload is applied.
    pub async fn update_preferences(
        &self,
        payload: UpdatePreferencesPayload,
    ) -> Result<Preferences, TimerError> {
        let mut inner = self.shared.state.lock().await;

        if let Some(minutes) = payload.duration_minutes {
            let duration_secs = config::clamp_duration_minutes(minutes);
            if duration_secs != inner.session.duration_secs()
                || inner.session.state() == TimerState::Completed
            {
                inner.session.set_duration(duration_secs)?;
                inner.ticker = None;
                inner.clear_suggestions();
            }
            inner.prefs.duration_seconds = duration_secs;
        }

        if let Some(task) = payload.task {
            inner.session.set_task(task.clone());
            inner.prefs.task = task;
        }

        if let Some(enabled) = payload.voice_enabled {
            inner.prefs.voice_enabled = enabled;
            if !enabled {
                self.shared.voice.stop();
            }
        }

        if let Some(auto_play) = payload.auto_play {
            inner.prefs.auto_play = auto_play;
        }

        if let Some(voice) = payload.selected_voice {
            inner.prefs.selected_voice = config::normalize_voice_name(Some(voice));
        }

        self.shared.persist(&inner.prefs);
        Ok(inner.prefs.clone())
    }

    /// Read the current suggestions aloud. Returns false when there is
    /// nothing to read or voice is disabled.
    pub async fn play_suggestions(&self, mode: PlayMode) -> bool {
        let inner = self.shared.state.lock().await;
        let Some(set) = inner.suggestions.as_ref() else {
            return false;
        };
        if !inner.prefs.voice_enabled {
            return false;
        }

        self.shared
            .voice
            .play(script::suggestion_sequence(set.items()), inner.voice_params(), mode);
        true
    }

    pub async fn test_voice(&self) {
        let params = self.shared.state.lock().await.voice_params();
        self.shared
            .voice
            .play(vec![script::TEST_PHRASE.to_string()], params, PlayMode::Restart);
    }

    pub fn stop_voice(&self) {
        self.shared.voice.stop();
    }

    /// Voice catalogue plus the selected voice. Picks and stores a default
    /// when nothing is selected yet.
    pub async fn voices(&self, refresh: bool) -> (Vec<Voice>, Option<String>) {
        let available = self.shared.voice.voices(refresh).await;

        let mut inner = self.shared.state.lock().await;
        if inner.prefs.selected_voice.is_none() {
            if let Some(default) = voices::pick_default(&available) {
                tracing::info!("Auto-selected voice '{}'", default.id);
                inner.prefs.selected_voice = Some(default.id.clone());
                self.shared.persist(&inner.prefs);
            }
        }

        let selected = inner.prefs.selected_voice.clone();
        (available, selected)
    }

    pub async fn ensure_voice_selected(&self) {
        let (available, selected) = self.voices(false).await;
        tracing::info!(
            "Voices: {} available, selected={:?}",
            available.len(),
            selected
        );
    }

    /// Stop the ticker and any playback.
    pub async fn shutdown(&self) {
        let mut inner = self.shared.state.lock().await;
        inner.ticker = None;
        self.shared.voice.stop();
        tracing::info!("Timer stopped");
    }
}

impl Shared {
    fn snapshot(&self, inner: &Inner) -> TimerSnapshot {
        TimerSnapshot::capture(
            &inner.session,
            inner.suggestions.as_ref(),
            inner.loading_suggestions,
            self.voice.is_playing(),
        )
    }

    fn persist(&self, prefs: &Preferences) {
        if let Err(e) = config::save(self.store.as_ref(), prefs) {
            tracing::warn!("Failed to persist preferences: {}", e);
        }
    }

    async fn is_current(&self, session_id: &str) -> bool {
        self.state.lock().await.session.id() == session_id
    }
}

async fn run_ticker(shared: Weak<Shared>, session_id: String) {
    let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

    loop {
        interval.tick().await;
        let Some(shared) = shared.upgrade() else {
            break;
        };

        let completion = {
            let mut inner = shared.state.lock().await;
            if inner.session.id() != session_id {
                break;
            }

            match inner.session.tick() {
                TickOutcome::Ignored => break,
                TickOutcome::Counting { .. } => continue,
                TickOutcome::Completed => {
                    if let Some(ticker) = inner.ticker.take() {
                        ticker.detach();
                    }
                    inner.suggestions = None;
                    inner.loading_suggestions = true;

                    Completion {
                        session_id: session_id.clone(),
                        task: inner.session.task().to_string(),
                        duration_secs: inner.session.duration_secs(),
                        voice_enabled: inner.prefs.voice_enabled,
                        auto_play: inner.prefs.auto_play,
                        params: inner.voice_params(),
                    }
                }
            }
        };

        tracing::info!("Timer completed: '{}'", completion.task);
        complete(shared, completion).await;
        break;
    }
}

/// Notification sound, suggestion fetch and spoken reminder. The reminder
/// plays while the fetch is still in flight; auto-played suggestions are
/// queued behind it.
async fn complete(shared: Arc<Shared>, completion: Completion) {
    shared.voice.chime();

    let fetch = async {
        let set = shared
            .suggestions
            .suggest_or_fallback(&completion.task, completion.duration_secs)
            .await;

        let mut inner = shared.state.lock().await;
        if inner.session.id() != completion.session_id {
            tracing::info!("Discarding suggestions for superseded session");
            return None;
        }
        inner.loading_suggestions = false;
        inner.suggestions = Some(set.clone());
        Some(set)
    };

    let reminder = async {
        if !completion.voice_enabled {
            return;
        }
        sleep(REMINDER_DELAY).await;
        if !shared.is_current(&completion.session_id).await {
            return;
        }
        shared.voice.play(
            vec![script::reminder(&completion.task, completion.duration_secs)],
            completion.params.clone(),
            PlayMode::Restart,
        );
    };

    let (set, ()) = tokio::join!(fetch, reminder);

    if let Some(set) = set {
        if completion.voice_enabled && completion.auto_play {
            shared.voice.play(
                script::suggestion_sequence(set.items()),
                completion.params,
                PlayMode::Layer,
            );
        }
    }
}
