// voice/voices.rs - Voice ranking, default selection and display names

use super::types::Voice;
use std::collections::HashSet;

/// Preferred voices in priority order, matched as substrings of the id.
const PREFERRED_VOICES: &[&str] = &[
    "Microsoft Zira",
    "Samantha",
    "Google US English",
    "en-us",
];

/// Drop duplicate ids and move preferred voices to the front.
pub fn rank(voices: Vec<Voice>) -> Vec<Voice> {
    let mut seen = HashSet::new();
    let mut unique: Vec<Voice> = voices
        .into_iter()
        .filter(|voice| seen.insert(voice.id.clone()))
        .collect();

    unique.sort_by_key(|voice| preference_rank(voice).unwrap_or(PREFERRED_VOICES.len()));
    unique
}

/// First preferred voice, otherwise the first one available.
pub fn pick_default(voices: &[Voice]) -> Option<&Voice> {
    voices
        .iter()
        .filter_map(|voice| preference_rank(voice).map(|rank| (rank, voice)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, voice)| voice)
        .or_else(|| voices.first())
}

pub fn display_name(voice: &Voice) -> String {
    let name = voice.id.as_str();

    let known = [
        ("Microsoft Zira", "Zira (Female, US English)"),
        ("Microsoft Hazel", "Hazel (Female, British English)"),
        ("Microsoft David", "David (Male, US English)"),
        ("Microsoft Mark", "Mark (Male, US English)"),
        ("Samantha", "Samantha (Female, US English)"),
        ("Victoria", "Victoria (Female, US English)"),
        ("Allison", "Allison (Female, US English)"),
        ("Alex", "Alex (Male, US English)"),
    ];
    if let Some((_, label)) = known.iter().find(|(needle, _)| name.contains(needle)) {
        return label.to_string();
    }

    if name.contains("Google") {
        match voice.lang.as_str() {
            "en-US" => return "Google (US English)".to_string(),
            "en-GB" => return "Google (British English)".to_string(),
            "en-AU" => return "Google (Australian English)".to_string(),
            _ => {}
        }
    }

    format!("{} ({})", name, language_label(&voice.lang))
}

fn language_label(lang: &str) -> &str {
    match lang {
        "en-US" => "US English",
        "en-GB" => "British English",
        "en-AU" => "Australian English",
        "en-CA" => "Canadian English",
        "en-IN" => "Indian English",
        other => other,
    }
}

fn preference_rank(voice: &Voice) -> Option<usize> {
    PREFERRED_VOICES
        .iter()
        .position(|preferred| voice.id.contains(preferred))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, lang: &str) -> Voice {
        Voice {
            id: id.to_string(),
            lang: lang.to_string(),
        }
    }

    #[test]
    fn rank_dedups_and_prefers_known_voices() {
        let ranked = rank(vec![
            voice("Fred", "en-US"),
            voice("Samantha", "en-US"),
            voice("Fred", "en-US"),
            voice("Microsoft Zira - English", "en-US"),
        ]);

        let ids: Vec<_> = ranked.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["Microsoft Zira - English", "Samantha", "Fred"]);
    }

    #[test]
    fn default_prefers_priority_then_first() {
        let voices = vec![voice("Fred", "en-US"), voice("Samantha", "en-US")];
        assert_eq!(pick_default(&voices).map(|v| v.id.as_str()), Some("Samantha"));

        let voices = vec![voice("af", "af"), voice("de", "de")];
        assert_eq!(pick_default(&voices).map(|v| v.id.as_str()), Some("af"));

        assert!(pick_default(&[]).is_none());
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name(&voice("Alex", "en-US")), "Alex (Male, US English)");
        assert_eq!(
            display_name(&voice("Google UK English Female", "en-GB")),
            "Google (British English)"
        );
        assert_eq!(display_name(&voice("Fred", "en-CA")), "Fred (Canadian English)");
        assert_eq!(display_name(&voice("de", "de")), "de (de)");
    }
}
