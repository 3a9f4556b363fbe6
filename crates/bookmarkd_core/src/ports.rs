//! crates/bookmarkd_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like the
//! generation backend or the on-disk profile store.

use async_trait::async_trait;
use crate::domain::{Book, ReadingLevel, StoryChapter, StoryPreview, UserProfile, WordDefinition};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services
/// (network, parsing, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("The request could not complete: {0}")]
    Network(String),
    #[error("The response could not be parsed: {0}")]
    MalformedResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Everything the story generation backend must produce for one chapter.
#[derive(Debug, Clone)]
pub struct ChapterRequest {
    pub title: String,
    /// Accumulated prior chapter text. Implementations keep only a bounded
    /// trailing window of this when building the request.
    pub prior_context: String,
    /// True when this chapter must conclude the story.
    pub is_final: bool,
    pub level: ReadingLevel,
    /// The choice the reader just made, absent for the opening chapter.
    pub choice: Option<String>,
}

#[async_trait]
pub trait StoryGenerationService: Send + Sync {
    /// Generates a preview (summary, twist, tone rating) for a book.
    async fn generate_preview(
        &self,
        title: &str,
        author: &str,
        vibe: &str,
    ) -> PortResult<StoryPreview>;

    /// Generates the next chapter of an interactive story.
    async fn generate_chapter(&self, request: ChapterRequest) -> PortResult<StoryChapter>;

    /// Looks up a reader-friendly definition for a word in context.
    /// `Ok(None)` means "no definition available, suppress the tooltip".
    async fn define_word(
        &self,
        word: &str,
        context: &str,
        level: ReadingLevel,
    ) -> PortResult<Option<WordDefinition>>;
}

/// Key-value persistence for the user profile and user-created books.
/// Absent entries mean a first run, not an error.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn load_profile(&self) -> PortResult<Option<UserProfile>>;

    async fn save_profile(&self, profile: &UserProfile) -> PortResult<()>;

    async fn delete_profile(&self) -> PortResult<()>;

    async fn load_user_books(&self) -> PortResult<Vec<Book>>;

    async fn save_user_books(&self, books: &[Book]) -> PortResult<()>;
}
