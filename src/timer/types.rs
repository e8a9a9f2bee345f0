// timer/types.rs - Countdown states and action outcomes

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Why `start` refused to run. Rejections are reported inline, not as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejection {
    EmptyTask,
    ZeroDuration,
}

impl StartRejection {
    pub fn warning(&self) -> &'static str {
        match self {
            StartRejection::EmptyTask => "Please enter a task before starting the timer",
            StartRejection::ZeroDuration => "Please set a timer duration greater than zero",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// idle -> running
    Started,
    /// paused -> running
    Resumed,
    /// completed -> running with a fresh countdown
    Restarted,
    /// Already running, nothing changed
    AlreadyRunning,
    Rejected(StartRejection),
}

impl StartOutcome {
    pub fn is_running(&self) -> bool {
        !matches!(self, StartOutcome::Rejected(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running
    Ignored,
    Counting { remaining: u64 },
    /// The countdown just reached zero
    Completed,
}

#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("Timer duration cannot be changed while the timer is running")]
    DurationLocked,
}
