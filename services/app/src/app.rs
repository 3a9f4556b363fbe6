//! services/app/src/app.rs
//!
//! The application orchestration layer. `App` owns the loaded profile, the
//! user-created books, and at most one active reading session, and is the
//! single authoritative update path for all of them: every mutation flows
//! through a method here, which computes the new state with the core crate
//! and then persists it.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use bookmarkd_core::catalog::{self, Catalog};
use bookmarkd_core::domain::{
    Book, Mood, MoodStory, ReadingLevel, ShelfTheme, StoryPreview, UserBadge, UserProfile,
    WordDefinition,
};
use bookmarkd_core::ledger::{self, ProfileEdit};
use bookmarkd_core::mood;
use bookmarkd_core::ports::{PortError, ProfileStore, StoryGenerationService};
use bookmarkd_core::session::{Advance, ReadingSession};

use crate::error::AppError;

/// Renders a seed string into an avatar image URL. Presentation only.
pub fn avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}

pub struct App {
    store: Arc<dyn ProfileStore>,
    generator: Arc<dyn StoryGenerationService>,
    profile: Option<UserProfile>,
    user_books: Vec<Book>,
    session: Option<ReadingSession>,
}

impl App {
    /// Loads the saved profile and user books from the store. Absent
    /// records mean a first run.
    pub async fn load(
        store: Arc<dyn ProfileStore>,
        generator: Arc<dyn StoryGenerationService>,
    ) -> Result<Self, AppError> {
        let profile = store.load_profile().await?;
        let user_books = store.load_user_books().await?;
        Ok(App {
            store,
            generator,
            profile,
            user_books,
            session: None,
        })
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn session(&self) -> Option<&ReadingSession> {
        self.session.as_ref()
    }

    fn signed_in(&self) -> Result<&UserProfile, AppError> {
        self.profile
            .as_ref()
            .ok_or_else(|| AppError::Internal("no user is signed in".to_string()))
    }

    // Persistence failures are fatal only to the write itself: the state
    // already lives in memory, so we log and carry on.
    async fn persist_profile(&self) {
        if let Some(profile) = &self.profile {
            if let Err(e) = self.store.save_profile(profile).await {
                warn!(error = %e, "failed to persist profile; continuing with in-memory state");
            }
        }
    }

    async fn persist_user_books(&self) {
        if let Err(e) = self.store.save_user_books(&self.user_books).await {
            warn!(error = %e, "failed to persist user books; continuing with in-memory state");
        }
    }

    //=====================================================================================
    // Identity
    //=====================================================================================

    pub async fn sign_in(&mut self, username: &str, avatar_seed: &str) -> Result<(), AppError> {
        let profile = ledger::new_profile(username, &avatar_url(avatar_seed));
        info!(username = %profile.username, "created local profile");
        self.profile = Some(profile);
        self.persist_profile().await;
        Ok(())
    }

    pub async fn sign_out(&mut self) -> Result<(), AppError> {
        self.exit_reading();
        self.profile = None;
        self.store.delete_profile().await?;
        Ok(())
    }

    pub async fn edit_profile(&mut self, edit: ProfileEdit) -> Result<(), AppError> {
        let current = self.signed_in()?.clone();
        self.profile = Some(ledger::apply_profile_edit(&current, edit));
        self.persist_profile().await;
        Ok(())
    }

    //=====================================================================================
    // Discovery
    //=====================================================================================

    fn catalog(&self) -> Catalog {
        Catalog::new(&self.user_books)
    }

    /// All books visible under the active mood, with earned badges attached.
    pub fn filtered_books(&self, active: Mood) -> Vec<Book> {
        let catalog = self.catalog();
        let books = match &self.profile {
            Some(profile) => catalog.annotated(profile),
            None => catalog.books().to_vec(),
        };
        books
            .into_iter()
            .filter(|b| mood::mood_matches(active, b))
            .collect()
    }

    /// Themed shelves for the discover screen. Under a specific mood,
    /// shelves with no matches are dropped so the UI can show its empty
    /// state when nothing at all matched.
    pub fn shelves(&self, active: Mood) -> Vec<(ShelfTheme, Vec<Book>)> {
        let books = self.filtered_books(active);
        ShelfTheme::ALL
            .into_iter()
            .map(|theme| {
                let on_shelf: Vec<Book> =
                    catalog::shelf(&books, theme).into_iter().cloned().collect();
                (theme, on_shelf)
            })
            .filter(|(_, on_shelf)| active == Mood::All || !on_shelf.is_empty())
            .collect()
    }

    pub fn mood_story_list(&self, active: Mood) -> Vec<MoodStory> {
        let stories = catalog::mood_stories();
        mood::stories_for_mood(active, &stories)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Always yields something displayable; generation failures surface as
    /// the clearly-generic fallback preview.
    pub async fn preview(&self, book_id: &str) -> Result<StoryPreview, AppError> {
        let catalog = self.catalog();
        let book = catalog
            .find(book_id)
            .ok_or_else(|| AppError::Port(PortError::NotFound(book_id.to_string())))?;
        let preview = self
            .generator
            .generate_preview(&book.title, &book.author, &book.vibe)
            .await
            .unwrap_or_else(|e| {
                warn!(book = %book_id, error = %e, "preview failed; using fallback");
                StoryPreview::fallback()
            });
        Ok(preview)
    }

    //=====================================================================================
    // Reading
    //=====================================================================================

    fn open_session(&mut self, book: Book, level: ReadingLevel) -> Result<(), AppError> {
        if self.session.is_some() {
            return Err(AppError::Internal(
                "a reading session is already open".to_string(),
            ));
        }
        self.signed_in()?;
        info!(book = %book.id, title = %book.title, "starting reading session");
        self.session = Some(ReadingSession::new(book, level, self.generator.clone()));
        Ok(())
    }

    /// Starts reading a catalog or user-created book and requests its
    /// opening chapter.
    pub async fn start_reading(&mut self, book_id: &str) -> Result<Advance, AppError> {
        let book = self
            .catalog()
            .find(book_id)
            .cloned()
            .ok_or_else(|| AppError::Port(PortError::NotFound(book_id.to_string())))?;
        let level = book
            .reading_level
            .or_else(|| self.profile.as_ref().map(|p| p.reading_preference))
            .unwrap_or_default();
        self.open_session(book, level)?;
        self.advance_open().await
    }

    /// Starts a curated mood story by adapting it into book shape.
    pub async fn start_mood_story(&mut self, story_id: &str) -> Result<Advance, AppError> {
        let stories = catalog::mood_stories();
        let story = stories
            .iter()
            .find(|s| s.id == story_id)
            .ok_or_else(|| AppError::Port(PortError::NotFound(story_id.to_string())))?;
        let book = catalog::book_from_mood_story(story);
        self.open_session(book, ReadingLevel::Standard)?;
        self.advance_open().await
    }

    async fn advance_open(&mut self) -> Result<Advance, AppError> {
        match self.session.as_mut() {
            Some(session) => Ok(session.open().await),
            None => Err(AppError::Internal("no open session".to_string())),
        }
    }

    pub async fn choose(&mut self, choice: &str) -> Result<Advance, AppError> {
        match self.session.as_mut() {
            Some(session) => Ok(session.choose(choice).await),
            None => Err(AppError::Internal("no open session".to_string())),
        }
    }

    /// Abandons the current session, discarding any in-flight request.
    pub fn exit_reading(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel_handle().cancel();
            info!(book = %session.book().id, "reading session exited");
        }
    }

    /// Looks up a word in the context of the current chapter. `None` means
    /// the tooltip is suppressed.
    pub async fn define(&self, word: &str) -> Option<WordDefinition> {
        let session = self.session.as_ref()?;
        let context = session.chapter().map(|c| c.content.as_str()).unwrap_or("");
        match self
            .generator
            .define_word(word, context, session.reading_level())
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(%word, error = %e, "definition lookup failed");
                None
            }
        }
    }

    /// Claims the badge of a finished session: the session is consumed, the
    /// ledger merges the `{book, badge}` pair into the profile, and the new
    /// profile is persisted. Returns `None` when no finished session exists.
    pub async fn claim_badge(&mut self) -> Result<Option<(Book, UserBadge)>, AppError> {
        let session = match self.session.take() {
            Some(s) if s.is_finished() => s,
            Some(s) => {
                // Not finished; put it back untouched.
                self.session = Some(s);
                return Ok(None);
            }
            None => return Ok(None),
        };
        let profile = self.signed_in()?.clone();
        let Some((book, badge)) = session.claim() else {
            return Ok(None);
        };
        info!(book = %book.id, badge = %badge.name, "session finalized");
        self.profile = Some(ledger::finalize(&profile, &book, &badge));
        self.persist_profile().await;
        Ok(Some((book, badge)))
    }

    //=====================================================================================
    // Creation
    //=====================================================================================

    /// Creates a user-authored book and persists it. Returns the new id.
    pub async fn create_story(
        &mut self,
        title: &str,
        theme: ShelfTheme,
        level: ReadingLevel,
        premise: &str,
    ) -> Result<String, AppError> {
        let author = self.signed_in()?.display_name.clone();
        let id = format!("u-{}", Uuid::new_v4());
        let book = Book {
            id: id.clone(),
            title: title.to_string(),
            author,
            description: premise.to_string(),
            theme,
            cover_image: format!("https://picsum.photos/seed/{}/800/450", id),
            tags: vec!["AI Generated".to_string(), theme.label().to_string()],
            vibe: "Custom".to_string(),
            read_count: "NEW".to_string(),
            total_chapters: 10,
            reading_level: Some(level),
            earned_badge: None,
        };
        self.user_books.insert(0, book);
        self.persist_user_books().await;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bookmarkd_core::domain::{ChapterChoice, StoryChapter};
    use bookmarkd_core::ports::{ChapterRequest, PortResult};
    use std::sync::Mutex;

    /// In-memory stand-in for the file store.
    #[derive(Default)]
    struct MemoryStore {
        profile: Mutex<Option<UserProfile>>,
        books: Mutex<Vec<Book>>,
    }

    #[async_trait]
    impl ProfileStore for MemoryStore {
        async fn load_profile(&self) -> PortResult<Option<UserProfile>> {
            Ok(self.profile.lock().unwrap().clone())
        }
        async fn save_profile(&self, profile: &UserProfile) -> PortResult<()> {
            *self.profile.lock().unwrap() = Some(profile.clone());
            Ok(())
        }
        async fn delete_profile(&self) -> PortResult<()> {
            *self.profile.lock().unwrap() = None;
            Ok(())
        }
        async fn load_user_books(&self) -> PortResult<Vec<Book>> {
            Ok(self.books.lock().unwrap().clone())
        }
        async fn save_user_books(&self, books: &[Book]) -> PortResult<()> {
            *self.books.lock().unwrap() = books.to_vec();
            Ok(())
        }
    }

    /// Answers every chapter request with a non-ending two-choice chapter.
    struct StubGenerator;

    #[async_trait]
    impl StoryGenerationService for StubGenerator {
        async fn generate_preview(&self, _: &str, _: &str, _: &str) -> PortResult<StoryPreview> {
            Ok(StoryPreview {
                summary: "summary".to_string(),
                plot_twist: "twist".to_string(),
                vibe_rating: "vibe".to_string(),
            })
        }
        async fn generate_chapter(&self, _: ChapterRequest) -> PortResult<StoryChapter> {
            Ok(StoryChapter {
                content: "chapter text".to_string(),
                choices: vec![
                    ChapterChoice { text: "A".to_string(), impact: "X".to_string() },
                    ChapterChoice { text: "B".to_string(), impact: "Y".to_string() },
                ],
                is_ending: false,
                unlocked_badge: None,
            })
        }
        async fn define_word(
            &self,
            _: &str,
            _: &str,
            _: ReadingLevel,
        ) -> PortResult<Option<WordDefinition>> {
            Ok(None)
        }
    }

    async fn signed_in_app() -> (App, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        let mut app = App::load(store.clone(), Arc::new(StubGenerator)).await.unwrap();
        app.sign_in("luna", "Luna").await.unwrap();
        (app, store)
    }

    #[tokio::test]
    async fn sign_in_persists_the_new_profile() {
        let (app, store) = signed_in_app().await;
        assert_eq!(app.profile().unwrap().username, "luna");
        assert!(store.profile.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn only_one_session_may_be_open() {
        let (mut app, _) = signed_in_app().await;
        app.start_reading("sh-1").await.unwrap();
        let second = app.start_reading("c-1").await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn reading_through_a_book_awards_and_persists_the_badge() {
        let (mut app, store) = signed_in_app().await;

        // "sh-1" has an 8-chapter budget.
        let mut outcome = app.start_reading("sh-1").await.unwrap();
        while outcome != Advance::Finished {
            outcome = app.choose("A").await.unwrap();
        }

        let (book, badge) = app.claim_badge().await.unwrap().expect("badge to claim");
        assert_eq!(book.id, "sh-1");

        let profile = app.profile().unwrap();
        assert_eq!(profile.stats.books_read, 1);
        assert_eq!(profile.completed_book_ids.get("sh-1"), Some(&badge.id));
        assert!(profile.recent_activity[0].contains("A Scandal in Bohemia"));

        let saved = store.profile.lock().unwrap().clone().unwrap();
        assert_eq!(saved, *profile);

        // The shelf view now shows the earned badge on the book.
        let shelves = app.shelves(Mood::All);
        let (_, crime_books) = shelves
            .iter()
            .find(|(theme, _)| *theme == ShelfTheme::Crime)
            .unwrap();
        let finished = crime_books.iter().find(|b| b.id == "sh-1").unwrap();
        assert_eq!(finished.earned_badge.as_ref().unwrap().id, badge.id);
    }

    #[tokio::test]
    async fn claim_on_an_unfinished_session_returns_nothing_and_keeps_it() {
        let (mut app, _) = signed_in_app().await;
        app.start_reading("sh-1").await.unwrap();

        assert!(app.claim_badge().await.unwrap().is_none());
        assert!(app.session().is_some(), "unfinished session must survive a stray claim");
    }

    #[tokio::test]
    async fn mood_story_sessions_keep_the_story_id() {
        let (mut app, _) = signed_in_app().await;
        app.start_mood_story("m-1").await.unwrap();
        assert_eq!(app.session().unwrap().book().id, "m-1");
    }

    #[tokio::test]
    async fn exit_clears_the_session() {
        let (mut app, _) = signed_in_app().await;
        app.start_reading("sh-1").await.unwrap();
        app.exit_reading();
        assert!(app.session().is_none());
        // A new session may open afterwards.
        app.start_reading("c-1").await.unwrap();
    }

    #[tokio::test]
    async fn created_stories_join_the_catalog_and_persist() {
        let (mut app, store) = signed_in_app().await;
        let id = app
            .create_story("My Tale", ShelfTheme::Fantasy, ReadingLevel::Chill, "A premise")
            .await
            .unwrap();

        assert!(app.filtered_books(Mood::All).iter().any(|b| b.id == id));
        assert_eq!(store.books.lock().unwrap().len(), 1);

        app.start_reading(&id).await.unwrap();
        assert_eq!(app.session().unwrap().book().total_chapters, 10);
    }

    #[tokio::test]
    async fn specific_moods_drop_empty_shelves() {
        let (app, _) = signed_in_app().await;
        let shelves = app.shelves(Mood::Uplifting);
        // No built-in book has a bright/uplifting/hopeful vibe.
        assert!(shelves.is_empty());
        assert_eq!(app.shelves(Mood::All).len(), 4);
    }

    #[tokio::test]
    async fn reading_requires_a_signed_in_user() {
        let store = Arc::new(MemoryStore::default());
        let mut app = App::load(store, Arc::new(StubGenerator)).await.unwrap();
        assert!(app.start_reading("sh-1").await.is_err());
    }
}
