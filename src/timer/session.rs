// timer/session.rs - Countdown state machine

use super::types::{StartOutcome, StartRejection, TickOutcome, TimerError, TimerState};
use crate::config::MAX_DURATION_MINUTES;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One countdown. Every transition goes through the methods below, so
/// `remaining_secs <= duration_secs` always holds.
///
/// The id changes whenever the countdown starts over (reset, restart after
/// completion, new duration). Work started for an older id is stale.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    task: String,
    duration_secs: u64,
    remaining_secs: u64,
    state: TimerState,
    completed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(task: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task: task.into(),
            duration_secs,
            remaining_secs: duration_secs,
            state: TimerState::Idle,
            completed_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn start(&mut self) -> StartOutcome {
        if self.state == TimerState::Running {
            return StartOutcome::AlreadyRunning;
        }
        if self.task.trim().is_empty() {
            return StartOutcome::Rejected(StartRejection::EmptyTask);
        }
        if self.duration_secs == 0 {
            return StartOutcome::Rejected(StartRejection::ZeroDuration);
        }

        let outcome = match self.state {
            TimerState::Completed => {
                self.rewind();
                StartOutcome::Restarted
            }
            TimerState::Paused => StartOutcome::Resumed,
            _ => StartOutcome::Started,
        };
        self.state = TimerState::Running;
        outcome
    }

    /// running -> paused. Returns false in any other state.
    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.state = TimerState::Paused;
        true
    }

    pub fn reset(&mut self) {
        self.rewind();
        self.state = TimerState::Idle;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }

        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return TickOutcome::Counting {
                remaining: self.remaining_secs,
            };
        }

        self.state = TimerState::Completed;
        self.completed_at = Some(Utc::now());
        TickOutcome::Completed
    }

    /// Extend duration and remaining time alike, up to the longest allowed
    /// duration. Not applied once completed or when already at the limit.
    pub fn add_time(&mut self, minutes: u64) -> bool {
        if self.state == TimerState::Completed {
            return false;
        }
        let headroom = (MAX_DURATION_MINUTES * 60).saturating_sub(self.duration_secs);
        let extra = minutes.saturating_mul(60).min(headroom);
        if extra == 0 {
            return false;
        }
        self.duration_secs += extra;
        self.remaining_secs = self.remaining_secs.saturating_add(extra);
        true
    }

    /// Replace the duration and return to idle. Refused while running.
    pub fn set_duration(&mut self, duration_secs: u64) -> Result<(), TimerError> {
        if self.state == TimerState::Running {
            return Err(TimerError::DurationLocked);
        }
        self.duration_secs = duration_secs;
        self.reset();
        Ok(())
    }

    pub fn set_task(&mut self, task: impl Into<String>) {
        self.task = task.into();
    }

    fn rewind(&mut self) {
        self.id = Uuid::new_v4().to_string();
        self.remaining_secs = self.duration_secs;
        self.completed_at = None;
    }
}
