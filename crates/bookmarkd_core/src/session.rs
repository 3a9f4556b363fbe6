//! crates/bookmarkd_core/src/session.rs
//!
//! The reading-session state machine. One session owns a single pass
//! through a single book: it issues chapter requests one at a time,
//! accumulates history, enforces the chapter budget, and synthesizes the
//! completion badge. Generation failures never surface here; the session
//! substitutes a fallback chapter so the reader is never stuck loading.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{BadgeRarity, Book, ReadingLevel, StoryChapter, UserBadge};
use crate::ports::{ChapterRequest, StoryGenerationService};

/// Source of badge rarity rolls, injectable so tests can pin the outcome.
pub trait RaritySource: Send {
    fn roll(&mut self) -> BadgeRarity;
}

/// The production roll: 20% epic, otherwise rare.
pub struct WeightedRarity;

impl RaritySource for WeightedRarity {
    fn roll(&mut self) -> BadgeRarity {
        if rand::thread_rng().gen_bool(0.2) {
            BadgeRarity::Epic
        } else {
            BadgeRarity::Rare
        }
    }
}

/// Always rolls the same rarity. Test helper.
pub struct FixedRarity(pub BadgeRarity);

impl RaritySource for FixedRarity {
    fn roll(&mut self) -> BadgeRarity {
        self.0
    }
}

/// The observable outcome of one session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new chapter is presented and awaiting a choice.
    Presented,
    /// The story reached its ending; a badge is ready to claim.
    Finished,
    /// The input was not accepted in the current state (already loading,
    /// already finished, or already cancelled) and nothing changed.
    Ignored,
    /// The session was exited while the request was in flight; the late
    /// response was discarded without mutating state.
    Cancelled,
}

/// One continuous reading pass through a single book.
///
/// At most one session should be active per user; the application layer
/// enforces that by construction.
pub struct ReadingSession {
    book: Book,
    level: ReadingLevel,
    history: Vec<String>,
    chapter: Option<StoryChapter>,
    loading: bool,
    finished: bool,
    earned_badge: Option<UserBadge>,
    cancel: CancellationToken,
    generator: Arc<dyn StoryGenerationService>,
    rarity: Box<dyn RaritySource>,
}

impl ReadingSession {
    pub fn new(book: Book, level: ReadingLevel, generator: Arc<dyn StoryGenerationService>) -> Self {
        Self::with_rarity_source(book, level, generator, Box::new(WeightedRarity))
    }

    pub fn with_rarity_source(
        book: Book,
        level: ReadingLevel,
        generator: Arc<dyn StoryGenerationService>,
        rarity: Box<dyn RaritySource>,
    ) -> Self {
        ReadingSession {
            book,
            level,
            history: Vec::new(),
            chapter: None,
            loading: false,
            finished: false,
            earned_badge: None,
            cancel: CancellationToken::new(),
            generator,
            rarity,
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn chapter(&self) -> Option<&StoryChapter> {
        self.chapter.as_ref()
    }

    /// Ordered texts of every chapter presented so far.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn earned_badge(&self) -> Option<&UserBadge> {
        self.earned_badge.as_ref()
    }

    pub fn reading_level(&self) -> ReadingLevel {
        self.level
    }

    /// A handle the UI can use to abandon the session; an in-flight chapter
    /// request observing the cancellation is discarded without touching
    /// session state.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Requests the opening chapter. The budget check runs here too: a
    /// one-chapter book asks for its first and final chapter at once.
    pub async fn open(&mut self) -> Advance {
        if self.chapter.is_some() {
            return Advance::Ignored;
        }
        self.advance(None).await
    }

    /// Advances the story with the reader's chosen option. Input while a
    /// request is in flight, or after the ending, is ignored.
    pub async fn choose(&mut self, choice: impl Into<String>) -> Advance {
        if self.chapter.is_none() {
            return Advance::Ignored;
        }
        self.advance(Some(choice.into())).await
    }

    async fn advance(&mut self, choice: Option<String>) -> Advance {
        if self.loading || self.finished || self.cancel.is_cancelled() {
            return Advance::Ignored;
        }
        self.loading = true;

        let chapter_number = self.history.len() as u32 + 1;
        // The budget is enforced by chapter count on every call, not by a
        // counter carried over from a prior request.
        let is_final = chapter_number >= self.book.total_chapters;
        let request = ChapterRequest {
            title: self.book.title.clone(),
            prior_context: self.history.join(" "),
            is_final,
            level: self.level,
            choice,
        };
        debug!(book = %self.book.id, chapter = chapter_number, is_final, "requesting chapter");

        let cancel = self.cancel.clone();
        let generator = self.generator.clone();
        let result = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(book = %self.book.id, "session exited while loading; response discarded");
                self.loading = false;
                return Advance::Cancelled;
            }
            result = generator.generate_chapter(request) => result,
        };

        let chapter = result.unwrap_or_else(|e| {
            warn!(book = %self.book.id, error = %e, "chapter generation failed; presenting fallback");
            StoryChapter::fallback(is_final)
        });

        self.history.push(chapter.content.clone());
        // Either the local budget or the server's explicit ending ends the
        // story, whichever fires first.
        if is_final || chapter.is_ending {
            self.earned_badge = Some(self.synthesize_badge(&chapter));
            self.finished = true;
        }
        self.chapter = Some(chapter);
        self.loading = false;

        if self.finished {
            Advance::Finished
        } else {
            Advance::Presented
        }
    }

    fn synthesize_badge(&mut self, chapter: &StoryChapter) -> UserBadge {
        let (default_name, icon) = self.book.theme.reward();
        let name = chapter
            .unlocked_badge
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_name.to_string());
        UserBadge {
            id: Uuid::new_v4().to_string(),
            name,
            icon: icon.to_string(),
            rarity: self.rarity.roll(),
            unlocked_at: Utc::now().date_naive(),
            book_id: Some(self.book.id.clone()),
        }
    }

    /// Consumes the session and hands the completion pair to the ledger.
    /// Returns `None` when the story never reached its ending; a session is
    /// never reused or resumed either way.
    pub fn claim(self) -> Option<(Book, UserBadge)> {
        match self.earned_badge {
            Some(badge) if self.finished => Some((self.book, badge)),
            _ => None,
        }
    }
}
