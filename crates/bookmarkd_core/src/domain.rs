//! crates/bookmarkd_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Serde renames match the JSON shapes used by the persistence layer and
//! the generation backend (camelCase fields, the original app's enums).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of shelf categories a book can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShelfTheme {
    Classics,
    SciFi,
    Fantasy,
    Crime,
}

impl ShelfTheme {
    /// All shelves, in display order.
    pub const ALL: [ShelfTheme; 4] = [
        ShelfTheme::Classics,
        ShelfTheme::SciFi,
        ShelfTheme::Fantasy,
        ShelfTheme::Crime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShelfTheme::Classics => "Inspired By Classics",
            ShelfTheme::SciFi => "Neon Horizons",
            ShelfTheme::Fantasy => "Magic Realms",
            ShelfTheme::Crime => "The Underworld",
        }
    }

    /// The default badge awarded for finishing a book on this shelf, used
    /// when the generation backend does not name one itself.
    pub fn reward(&self) -> (&'static str, &'static str) {
        match self {
            ShelfTheme::Classics => ("Classic Explorer", "🏛️"),
            ShelfTheme::SciFi => ("Void Traveler", "🚀"),
            ShelfTheme::Fantasy => ("Star Weaver", "✨"),
            ShelfTheme::Crime => ("Noir Shadow", "🕵️"),
        }
    }
}

/// Controls the vocabulary and register of generated chapters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingLevel {
    Chill,
    #[default]
    Standard,
    Academic,
}

/// The user-selected vibe filter. `All` is the universal match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mood {
    All,
    Cozy,
    Adventure,
    Romantic,
    Dark,
    Mysterious,
    Uplifting,
    Melancholic,
    FastPaced,
}

/// A catalog entry: either a built-in book, a user-created one, or a mood
/// story adapted into book shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub theme: ShelfTheme,
    pub cover_image: String,
    pub tags: Vec<String>,
    pub vibe: String,
    /// Display-only counter, kept opaque ("22.1K", "NEW").
    pub read_count: String,
    /// The session's completion budget. Always >= 1.
    pub total_chapters: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_level: Option<ReadingLevel>,
    /// Attached at query time by joining against the completed-book ledger.
    /// Never stored on the catalog item itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earned_badge: Option<UserBadge>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryLength {
    Short,
    Standard,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryOrigin {
    Original,
    #[serde(rename = "Inspired by Classics")]
    InspiredByClassics,
}

impl StoryOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            StoryOrigin::Original => "Original",
            StoryOrigin::InspiredByClassics => "Inspired by Classics",
        }
    }
}

/// A curated interactive start, defined at build time and read-only.
/// Converted to a [`Book`] on demand, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodStory {
    pub id: String,
    pub title: String,
    pub hook: String,
    pub genre: String,
    pub tone: String,
    pub length: StoryLength,
    pub origin: StoryOrigin,
    pub key_choice: String,
    pub mood_id: Mood,
    pub cover_image: String,
    pub vibe_color: String,
}

/// One branching option offered at the end of a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterChoice {
    pub text: String,
    pub impact: String,
}

/// A generated story segment. `choices` is empty exactly when the chapter
/// is terminal; `unlocked_badge` is authoritative only when `is_ending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChapter {
    pub content: String,
    pub choices: Vec<ChapterChoice>,
    #[serde(default)]
    pub is_ending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_badge: Option<String>,
}

impl StoryChapter {
    /// The clearly-fictional chapter substituted when generation fails.
    /// Non-terminal fallbacks always offer a retry path; terminal ones end
    /// the story so the session can never hang.
    pub fn fallback(is_final: bool) -> Self {
        let choices = if is_final {
            Vec::new()
        } else {
            vec![
                ChapterChoice {
                    text: "Retry the connection".to_string(),
                    impact: "Persistence".to_string(),
                },
                ChapterChoice {
                    text: "Walk into the digital mist".to_string(),
                    impact: "Adventure".to_string(),
                },
            ]
        };
        StoryChapter {
            content: "The system encountered a logic loop... The story continues in your imagination."
                .to_string(),
            choices,
            is_ending: is_final,
            unlocked_badge: None,
        }
    }
}

/// A generated book preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPreview {
    pub summary: String,
    pub plot_twist: String,
    pub vibe_rating: String,
}

impl StoryPreview {
    /// Generic-but-displayable preview used when generation fails.
    pub fn fallback() -> Self {
        StoryPreview {
            summary: "This story is so secret, even the AI is keeping quiet. Dive in to find out!"
                .to_string(),
            plot_twist: "Wait... the protagonist was the antagonist all along?!".to_string(),
            vibe_rating: "Vibe Check: Immaculate ✨".to_string(),
        }
    }
}

/// A tooltip definition for a word tapped inside a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordDefinition {
    pub definition: String,
    pub example: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// An immutable award record, created exactly once per completed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub rarity: BadgeRarity,
    pub unlocked_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub books_read: u32,
    pub streak: u32,
    pub pages_turned: String,
}

/// The client-local user record. `badges` and `recent_activity` are ordered
/// newest-first; `completed_book_ids` maps book id -> badge id, at most one
/// entry per book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: String,
    #[serde(default)]
    pub reading_preference: ReadingLevel,
    pub stats: UserStats,
    pub badges: Vec<UserBadge>,
    pub recent_activity: Vec<String>,
    #[serde(default)]
    pub completed_book_ids: HashMap<String, String>,
}
