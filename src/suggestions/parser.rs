// suggestions/parser.rs - Best-effort parsing of free-text model replies

use super::fallback;
use super::types::{SuggestionSet, SuggestionSource, SUGGESTION_COUNT};
use rand::Rng;
use regex::{Match, Regex};
use std::sync::OnceLock;

pub const MIN_CHARS: usize = 4;
pub const MAX_CHARS: usize = 160;

fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "1." / "**2)" / "3、" at line start, or inline after whitespace
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*(?:[*_#>-]+[ \t]*)?(?P<line>\d{1,2})[.)、:：][ \t]*|[ \t](?P<inline>\d{1,2})(?:[.)][ \t]+|、)",
        )
        .expect("list marker regex")
    })
}

fn think_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<think>.*?</think>").expect("think block regex"))
}

/// Split, clean and validate a model reply. Returns at most the entries that
/// pass the length bounds, de-duplicated, in reply order.
pub fn parse(raw: &str) -> Vec<String> {
    let text = strip_think_blocks(raw);
    let mut out: Vec<String> = Vec::new();

    for candidate in split_candidates(&text) {
        let cleaned = clean(&candidate);
        let len = cleaned.chars().count();
        if !(MIN_CHARS..=MAX_CHARS).contains(&len) {
            continue;
        }
        // headings such as "Here are some ideas:"
        if cleaned.ends_with(':') || cleaned.ends_with('：') {
            continue;
        }
        if out.iter().any(|e| e.to_lowercase() == cleaned.to_lowercase()) {
            continue;
        }
        out.push(cleaned);
    }

    out
}

/// Pad `parsed` from the pool and truncate to exactly three entries.
pub fn finalize<R: Rng + ?Sized>(mut parsed: Vec<String>, rng: &mut R) -> SuggestionSet {
    parsed.truncate(SUGGESTION_COUNT);

    let source = match parsed.len() {
        0 => SuggestionSource::Fallback,
        SUGGESTION_COUNT => SuggestionSource::Model,
        _ => SuggestionSource::Padded,
    };

    let missing = SUGGESTION_COUNT - parsed.len();
    if missing > 0 {
        let padding = fallback::pick_excluding(rng, &parsed, missing);
        parsed.extend(padding);
    }

    SuggestionSet::new(parsed, source).unwrap_or_else(|| SuggestionSet::from_pool(rng))
}

fn strip_think_blocks(text: &str) -> String {
    let closed = think_block().replace_all(text, "");
    match closed.find("<think>") {
        Some(start) => closed[..start].to_string(),
        None => closed.into_owned(),
    }
}

/// Line-start markers always count. An inline marker counts only when it
/// continues the numbering, so "walk for 5. then ..." stays one entry.
fn list_markers(text: &str) -> Vec<Match<'_>> {
    let mut accepted: Vec<(u32, Match<'_>)> = Vec::new();

    for caps in list_marker().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let (number, inline) = match (caps.name("line"), caps.name("inline")) {
            (Some(n), _) => (n.as_str(), false),
            (None, Some(n)) => (n.as_str(), true),
            (None, None) => continue,
        };
        let Ok(number) = number.parse::<u32>() else {
            continue;
        };

        if inline && !accepted.last().is_some_and(|(prev, _)| prev + 1 == number) {
            continue;
        }
        accepted.push((number, whole));
    }

    accepted.into_iter().map(|(_, m)| m).collect()
}

fn split_candidates(text: &str) -> Vec<String> {
    let markers = list_markers(text);

    if !markers.is_empty() {
        // anything before the first marker is preamble
        return markers
            .iter()
            .enumerate()
            .filter_map(|(idx, m)| {
                let end = markers.get(idx + 1).map(|n| n.start()).unwrap_or(text.len());
                text[m.end()..end]
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .map(str::to_string)
            })
            .collect();
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() >= SUGGESTION_COUNT {
        return lines.into_iter().map(str::to_string).collect();
    }

    lines.into_iter().flat_map(split_sentences).collect()
}

fn split_sentences(line: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        let boundary = match ch {
            '。' | '！' | '？' => true,
            '.' | '!' | '?' => chars.peek().map_or(true, |next| next.is_whitespace()),
            _ => false,
        };
        if boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

fn clean(candidate: &str) -> String {
    let stripped = candidate
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '·' | '>') || c.is_whitespace());

    let mut text = stripped.replace("**", "").replace("__", "");
    text.retain(|c| !matches!(c, '[' | ']' | '【' | '】'));

    let text = text
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '“' | '”' | '\'' | '「' | '」'))
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | '，' | '；'));

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_list_with_preamble() {
        let reply = "Here are three ideas for you:\n\
                     1. Take a short walk around the office.\n\
                     2. Stretch your shoulders and neck.\n\
                     3. Refill your water bottle.\n\
                     Enjoy your break!";

        let parsed = parse(reply);

        assert_eq!(
            parsed,
            vec![
                "Take a short walk around the office.",
                "Stretch your shoulders and neck.",
                "Refill your water bottle.",
            ]
        );
    }

    #[test]
    fn inline_numbering_on_one_line() {
        let parsed = parse("1. Walk outside 2. Drink some tea 3. Close your eyes for a minute");
        assert_eq!(
            parsed,
            vec!["Walk outside", "Drink some tea", "Close your eyes for a minute"]
        );
    }

    #[test]
    fn bold_numbered_list_with_preamble() {
        let reply = "Here are three ideas:\n\
                     **1. Walk around the block**\n\
                     **2. Stretch your shoulders**\n\
                     **3. Drink a glass of water**";

        let parsed = parse(reply);

        assert_eq!(
            parsed,
            vec![
                "Walk around the block",
                "Stretch your shoulders",
                "Drink a glass of water",
            ]
        );
        assert!(parsed.iter().all(|s| !s.starts_with(|c: char| c.is_ascii_digit())));
    }

    #[test]
    fn bold_number_only() {
        let parsed = parse("**1.** Walk outside\n**2.** Stretch\n**3.** Hydrate");
        assert_eq!(parsed, vec!["Walk outside", "Stretch", "Hydrate"]);
    }

    #[test]
    fn sentence_ending_number_is_not_a_marker() {
        let parsed = parse("1. Walk for 5. Then stretch your back\n2. Drink water\n3. Breathe deeply");
        assert_eq!(
            parsed,
            vec!["Walk for 5. Then stretch your back", "Drink water", "Breathe deeply"]
        );
    }

    #[test]
    fn decimals_are_not_list_markers() {
        let parsed = parse("1. Rest your eyes for 2.5 minutes\n2. Drink water");
        assert_eq!(parsed[0], "Rest your eyes for 2.5 minutes");
    }

    #[test]
    fn bracket_and_markdown_artifacts_are_stripped() {
        let parsed = parse("1. [**Stretch** your arms]\n2) \"Walk to the window\"\n3、【深呼吸十次】");
        assert_eq!(
            parsed,
            vec!["Stretch your arms", "Walk to the window", "深呼吸十次"]
        );
    }

    #[test]
    fn bullets_without_numbers_fall_back_to_lines() {
        let parsed = parse("Some ideas:\n- Walk around\n- Stretch your back\n* Drink water");
        assert_eq!(parsed, vec!["Walk around", "Stretch your back", "Drink water"]);
    }

    #[test]
    fn single_paragraph_is_split_into_sentences() {
        let parsed = parse("Go for a walk. Stretch a little! Have a glass of water?");
        assert_eq!(
            parsed,
            vec!["Go for a walk.", "Stretch a little!", "Have a glass of water?"]
        );
    }

    #[test]
    fn length_bounds_and_duplicates_are_filtered() {
        let long = "x".repeat(MAX_CHARS + 1);
        let reply = format!("1. ok\n2. {}\n3. Walk around\n4. walk around\n5. Drink water", long);

        assert_eq!(parse(&reply), vec!["Walk around", "Drink water"]);
    }

    #[test]
    fn think_blocks_are_ignored() {
        let reply = "<think>the user wants 1. ideas</think>1. Walk\u{20}outside\n2. Stretch\n3. Hydrate";
        assert_eq!(parse(reply), vec!["Walk outside", "Stretch", "Hydrate"]);
        assert!(parse("<think>never closed 1. Walk around").is_empty());
    }

    #[test]
    fn finalize_pads_short_replies_from_pool() {
        let mut rng = rand::thread_rng();
        let set = finalize(vec!["Walk outside".to_string()], &mut rng);

        assert_eq!(set.items().len(), 3);
        assert_eq!(set.items()[0], "Walk outside");
        assert!(set.items()[1..].iter().all(|s| fallback::is_fallback(s)));
        assert_ne!(set.items()[1], set.items()[2]);
        assert_eq!(set.source(), SuggestionSource::Padded);
    }

    #[test]
    fn finalize_truncates_long_replies() {
        let mut rng = rand::thread_rng();
        let parsed: Vec<String> = (1..=5).map(|i| format!("Idea number {}", i)).collect();

        let set = finalize(parsed, &mut rng);

        assert_eq!(set.items(), &["Idea number 1", "Idea number 2", "Idea number 3"]);
        assert_eq!(set.source(), SuggestionSource::Model);
    }
}
