pub mod controller;
pub mod progress;
pub mod session;
pub mod types;

pub use controller::TimerController;
pub use progress::{format_clock, progress_percent, TimerSnapshot};
pub use session::Session;
pub use types::{StartOutcome, StartRejection, TickOutcome, TimerError, TimerState};
