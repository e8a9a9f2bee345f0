// voice/script.rs - Spoken texts

pub const SUGGESTIONS_INTRO: &str = "Here are three ideas for your break.";
pub const SUGGESTIONS_OUTRO: &str = "Enjoy your break!";
pub const TEST_PHRASE: &str = "Take a break and rest well";

/// Completion notice spoken after the notification sound.
pub fn reminder(task: &str, duration_secs: u64) -> String {
    let minutes = duration_secs / 60;
    let span = if minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{} minutes", minutes)
    };

    match task.trim() {
        "" => format!("Time's up! You stayed focused for {}. Time to take a break.", span),
        task => format!("Time's up! You focused on {} for {}. Time to take a break.", task, span),
    }
}

/// Intro, one numbered line per suggestion, outro.
pub fn suggestion_sequence(items: &[String]) -> Vec<String> {
    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(SUGGESTIONS_INTRO.to_string());
    lines.extend(
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| format!("Suggestion {}. {}", idx + 1, item)),
    );
    lines.push(SUGGESTIONS_OUTRO.to_string());
    lines
}
