pub mod catalog;
pub mod domain;
pub mod ledger;
pub mod mood;
pub mod ports;
pub mod session;

pub use domain::{
    BadgeRarity, Book, ChapterChoice, Mood, MoodStory, ReadingLevel, ShelfTheme, StoryChapter,
    StoryLength, StoryOrigin, StoryPreview, UserBadge, UserProfile, UserStats, WordDefinition,
};
pub use ports::{ChapterRequest, PortError, PortResult, ProfileStore, StoryGenerationService};
pub use session::{Advance, ReadingSession};
