//! crates/bookmarkd_core/src/mood.rs
//!
//! The mood filter: a pure predicate mapping the active mood to a fixed
//! boolean expression over a book's shelf theme, lower-cased vibe string,
//! and lower-cased tag set. This table is the single source of truth for
//! mood filtering.

use crate::domain::{Book, Mood, MoodStory, ShelfTheme};

fn vibe_has(vibe: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| vibe.contains(n))
}

/// Returns whether `book` is included under the active `mood`.
/// `Mood::All` matches everything.
pub fn mood_matches(mood: Mood, book: &Book) -> bool {
    let vibe = book.vibe.to_lowercase();
    let tags: Vec<String> = book.tags.iter().map(|t| t.to_lowercase()).collect();
    let has_tag = |t: &str| tags.iter().any(|tag| tag == t);
    let theme = book.theme;

    match mood {
        Mood::All => true,
        Mood::Adventure => theme == ShelfTheme::Fantasy || vibe_has(&vibe, &["adventure", "tense"]),
        Mood::Melancholic => {
            theme == ShelfTheme::Classics || vibe_has(&vibe, &["melancholic", "refined"])
        }
        Mood::Cozy => vibe_has(&vibe, &["sweet", "witty", "enchanting", "romantic", "cozy"]),
        Mood::FastPaced => {
            theme == ShelfTheme::SciFi || vibe_has(&vibe, &["gritty", "electric", "fast"])
        }
        Mood::Mysterious => {
            theme == ShelfTheme::Crime
                || has_tag("detective")
                || vibe_has(&vibe, &["intellectual", "mystery"])
        }
        Mood::Romantic => vibe_has(&vibe, &["romantic", "heartfelt"]) || has_tag("romance"),
        Mood::Dark => vibe_has(&vibe, &["dark", "gritty"]) || theme == ShelfTheme::Crime,
        Mood::Uplifting => vibe_has(&vibe, &["bright", "uplifting", "hopeful"]),
    }
}

/// Selects the curated stories matching the active mood. Under `Mood::All`
/// every story is shown, so the curated shelf is never empty.
pub fn stories_for_mood(mood: Mood, stories: &[MoodStory]) -> Vec<&MoodStory> {
    stories
        .iter()
        .filter(|s| mood == Mood::All || s.mood_id == mood)
        .collect()
}
