use super::session::Session;
use super::types::TimerState;
use crate::suggestions::{SuggestionSet, SuggestionSource};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a renderer needs to draw the timer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub session_id: String,
    pub task: String,
    pub duration_seconds: u64,
    pub remaining_seconds: u64,
    pub state: TimerState,
    pub clock: String,
    pub progress: f64,
    pub suggestions: Vec<String>,
    pub suggestion_source: Option<SuggestionSource>,
    pub is_loading_suggestions: bool,
    pub is_playing_voice: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TimerSnapshot {
    pub fn capture(
        session: &Session,
        suggestions: Option<&SuggestionSet>,
        is_loading_suggestions: bool,
        is_playing_voice: bool,
    ) -> Self {
        Self {
            session_id: session.id().to_string(),
            task: session.task().to_string(),
            duration_seconds: session.duration_secs(),
            remaining_seconds: session.remaining_secs(),
            state: session.state(),
            clock: format_clock(session.remaining_secs()),
            progress: progress_percent(session.remaining_secs(), session.duration_secs()),
            suggestions: suggestions
                .map(|set| set.items().to_vec())
                .unwrap_or_default(),
            suggestion_source: suggestions.map(|set| set.source()),
            is_loading_suggestions,
            is_playing_voice,
            completed_at: session.completed_at(),
        }
    }
}

/// `MM:SS` below one hour, `HH:MM:SS` from one hour up.
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Share of the countdown still remaining, 0-100.
pub fn progress_percent(remaining_secs: u64, duration_secs: u64) -> f64 {
    if duration_secs == 0 {
        return 0.0;
    }
    remaining_secs as f64 / duration_secs as f64 * 100.0
}
