// suggestions/fallback.rs - Static pool of break activities

use rand::seq::SliceRandom;
use rand::Rng;

/// Pre-written activities used whenever the model cannot be reached or its
/// reply comes up short.
pub const FALLBACK_POOL: &[&str] = &[
    "Stand up and walk around the room for a couple of minutes.",
    "Stretch your neck, shoulders and back slowly.",
    "Look at something 20 feet away for 20 seconds to rest your eyes.",
    "Drink a full glass of water.",
    "Take ten slow, deep breaths with your eyes closed.",
    "Step outside or open a window for some fresh air.",
    "Roll your wrists and shake out your hands.",
    "Tidy one small area of your desk.",
    "Listen to one song you like without doing anything else.",
    "Do a quick set of ten squats or calf raises.",
];

/// Draw `count` distinct entries from the pool.
pub fn pick<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<String> {
    FALLBACK_POOL
        .choose_multiple(rng, count)
        .map(|s| s.to_string())
        .collect()
}

/// Draw up to `count` pool entries that are not already in `existing`.
pub fn pick_excluding<R: Rng + ?Sized>(
    rng: &mut R,
    existing: &[String],
    count: usize,
) -> Vec<String> {
    let mut candidates: Vec<&str> = FALLBACK_POOL
        .iter()
        .copied()
        .filter(|entry| !existing.iter().any(|e| e.eq_ignore_ascii_case(entry)))
        .collect();
    candidates.shuffle(rng);
    candidates
        .into_iter()
        .take(count)
        .map(str::to_string)
        .collect()
}

pub fn is_fallback(text: &str) -> bool {
    FALLBACK_POOL.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn pick_returns_distinct_pool_entries() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let picked = pick(&mut rng, 3);
            assert_eq!(picked.len(), 3);
            assert!(picked.iter().all(|s| is_fallback(s)));
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(unique.len(), 3);
        }
    }

    #[test]
    fn pick_excluding_skips_existing_entries() {
        let mut rng = rand::thread_rng();
        let existing: Vec<String> = FALLBACK_POOL[..8].iter().map(|s| s.to_string()).collect();

        let picked = pick_excluding(&mut rng, &existing, 3);

        // only two entries remain outside `existing`
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|p| !existing.contains(p)));
    }
}
