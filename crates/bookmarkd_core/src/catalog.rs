//! crates/bookmarkd_core/src/catalog.rs
//!
//! The static content catalog: built-in books, curated mood stories, the
//! combined catalog view, and the adapter that turns a mood story into the
//! canonical book shape so it can flow through the same reading pipeline.

use crate::domain::{
    Book, Mood, MoodStory, ReadingLevel, ShelfTheme, StoryLength, StoryOrigin, UserProfile,
};

fn book(
    id: &str,
    title: &str,
    author: &str,
    description: &str,
    theme: ShelfTheme,
    cover_image: &str,
    tags: &[&str],
    vibe: &str,
    read_count: &str,
    total_chapters: u32,
    reading_level: Option<ReadingLevel>,
) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        description: description.to_string(),
        theme,
        cover_image: cover_image.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        vibe: vibe.to_string(),
        read_count: read_count.to_string(),
        total_chapters,
        reading_level,
        earned_badge: None,
    }
}

/// The built-in shelf contents, defined at build time.
pub fn initial_books() -> Vec<Book> {
    vec![
        book(
            "c-1",
            "Pride & Prejudice",
            "Jane Austen",
            "Elizabeth Bennet navigates the complex social codes of Longbourn with razor-sharp wit.",
            ShelfTheme::Classics,
            "https://images.unsplash.com/photo-1544947950-fa07a98d237f?q=80&w=800&auto=format&fit=crop",
            &["Romance", "Social Commentary", "Abridged"],
            "Witty & Refined",
            "22.1K",
            15,
            Some(ReadingLevel::Academic),
        ),
        book(
            "c-2",
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            "A faithful abridgment following Nick Carraway into the tragic world of Jay Gatsby.",
            ShelfTheme::Classics,
            "https://images.unsplash.com/photo-1512820790803-83ca734da794?q=80&w=800&auto=format&fit=crop",
            &["Jazz Age", "Tragedy", "Classic"],
            "Melancholic & Glamorous",
            "18.9K",
            10,
            Some(ReadingLevel::Standard),
        ),
        book(
            "c-3",
            "Sense & Sensibility",
            "Jane Austen",
            "The Dashwood sisters find love and loss in the changing English landscape.",
            ShelfTheme::Classics,
            "https://images.unsplash.com/photo-1543003923-4350ffde1ee9?q=80&w=800&auto=format&fit=crop",
            &["Sisters", "19th Century", "Drama"],
            "Emotional & Poetic",
            "15.4K",
            12,
            None,
        ),
        book(
            "1",
            "The Gilded Crown",
            "Elara Moon",
            "A thief discovers she is the rightful heir to a kingdom ruled by star-magic.",
            ShelfTheme::Fantasy,
            "https://images.unsplash.com/photo-1518709268805-4e9042af9f23?q=80&w=800&auto=format&fit=crop",
            &["Magic", "Royalty", "Tension"],
            "Enchanting & Tense",
            "45.2K",
            12,
            Some(ReadingLevel::Standard),
        ),
        book(
            "f-2",
            "Starlight Weaver",
            "Cassian Thorne",
            "In a city where dreams are woven into cloth, one weaver creates a forbidden pattern.",
            ShelfTheme::Fantasy,
            "https://images.unsplash.com/photo-1534447677768-be436bb09401?q=80&w=800&auto=format&fit=crop",
            &["Art", "Conspiracy", "Dreams"],
            "Atmospheric & Ethereal",
            "28.7K",
            14,
            None,
        ),
        book(
            "2",
            "Code: Genesis",
            "Kaelen Void",
            "In a world of silicon and neon, an AI starts dreaming of a forgotten Earth.",
            ShelfTheme::SciFi,
            "https://images.unsplash.com/photo-1550745165-9bc0b252726f?q=80&w=800&auto=format&fit=crop",
            &["Cyberpunk", "Mystery", "AI"],
            "Electric & Gritty",
            "12.8K",
            15,
            Some(ReadingLevel::Standard),
        ),
        book(
            "s-2",
            "Neon Horizons",
            "Zara X",
            "The last transmission from a dying sun reaches a lonely freighter pilot.",
            ShelfTheme::SciFi,
            "https://images.unsplash.com/photo-1614728263952-84ea206f25ab?q=80&w=800&auto=format&fit=crop",
            &["Space", "Isolation", "Action"],
            "Cinematic & Fast",
            "9.2K",
            18,
            None,
        ),
        book(
            "sh-1",
            "A Scandal in Bohemia",
            "Arthur Conan Doyle",
            "The definitive abridged encounter between Sherlock Holmes and Irene Adler.",
            ShelfTheme::Crime,
            "https://images.unsplash.com/photo-1589829545856-d10d557cf95f?q=80&w=800&auto=format&fit=crop",
            &["Sherlock", "Detective", "Mystery"],
            "Intellectual & Tense",
            "34.5K",
            8,
            Some(ReadingLevel::Academic),
        ),
        book(
            "cr-2",
            "Noir Shadows",
            "Detective Vane",
            "A private eye investigates a string of digital disappearances in Neo-London.",
            ShelfTheme::Crime,
            "https://images.unsplash.com/photo-1478720568477-152d9b164e26?q=80&w=800&auto=format&fit=crop",
            &["Investigation", "Rainy", "Tech"],
            "Dark & Gritty",
            "41.0K",
            12,
            None,
        ),
    ]
}

fn story(
    id: &str,
    title: &str,
    hook: &str,
    genre: &str,
    tone: &str,
    length: StoryLength,
    origin: StoryOrigin,
    key_choice: &str,
    mood_id: Mood,
    cover_image: &str,
    vibe_color: &str,
) -> MoodStory {
    MoodStory {
        id: id.to_string(),
        title: title.to_string(),
        hook: hook.to_string(),
        genre: genre.to_string(),
        tone: tone.to_string(),
        length,
        origin,
        key_choice: key_choice.to_string(),
        mood_id,
        cover_image: cover_image.to_string(),
        vibe_color: vibe_color.to_string(),
    }
}

/// The handcrafted mood matches, one or more per mood.
pub fn mood_stories() -> Vec<MoodStory> {
    vec![
        story(
            "m-1",
            "The Tea Shop at the Edge of Memory",
            "In a city that never stops, Pip finds a cafe where the tea tastes like your favorite childhood birthday.",
            "Low-stakes Fantasy",
            "Warm & Whimsical",
            StoryLength::Short,
            StoryOrigin::Original,
            "Drink the \"Forgotten Earl Grey\" to remember a lost friend, or \"Tomorrow Matcha\" for a glimpse of your future?",
            Mood::Cozy,
            "https://images.unsplash.com/photo-1544947950-fa07a98d237f?q=80&w=800&auto=format&fit=crop",
            "from-orange-400 to-amber-600",
        ),
        story(
            "m-2",
            "404: Earth Not Found",
            "The last scout ship just received a signal from a planet that shouldn't exist. It's playing 80s pop music.",
            "Space Adventure",
            "High-Energy & Snappy",
            StoryLength::Standard,
            StoryOrigin::Original,
            "Initiate a blind landing towards the music, or orbit and scan for hostile digital signatures?",
            Mood::Adventure,
            "https://images.unsplash.com/photo-1614728263952-84ea206f25ab?q=80&w=800&auto=format&fit=crop",
            "from-cyan-400 to-blue-600",
        ),
        story(
            "m-3",
            "Star-Crossed on Station 9",
            "Two teenagers from rival asteroid mining colonies find a secret communication channel. Inspired by Romeo & Juliet.",
            "Romance / Sci-Fi",
            "Heartfelt & Tense",
            StoryLength::Standard,
            StoryOrigin::InspiredByClassics,
            "Leak the secret coordinates to meet in person, or keep the connection digital and safe?",
            Mood::Romantic,
            "https://images.unsplash.com/photo-1534447677768-be436bb09401?q=80&w=800&auto=format&fit=crop",
            "from-pink-500 to-rose-400",
        ),
        story(
            "m-4",
            "The Hollow Sovereign",
            "A crown of iron and a ghost in the mirror. Power comes at a price only the shadows can pay. Inspired by Macbeth.",
            "Dark Fantasy",
            "Ominous & Gritty",
            StoryLength::Long,
            StoryOrigin::InspiredByClassics,
            "Seize the throne while the King sleeps, or flee the castle before the prophecy takes hold?",
            Mood::Dark,
            "https://images.unsplash.com/photo-1518709268805-4e9042af9f23?q=80&w=800&auto=format&fit=crop",
            "from-slate-800 to-red-950",
        ),
        story(
            "m-5",
            "The Cipher in Apt 4C",
            "Your neighbor left their door open. Inside, every wall is covered in binary code—and your name is at the center.",
            "Techno-Thriller",
            "Suspenseful & Sharp",
            StoryLength::Standard,
            StoryOrigin::Original,
            "Photograph the code and call the authorities, or step inside and solve the first line yourself?",
            Mood::Mysterious,
            "https://images.unsplash.com/photo-1478720568477-152d9b164e26?q=80&w=800&auto=format&fit=crop",
            "from-amber-600 to-stone-900",
        ),
        story(
            "m-6",
            "Bloom in the Grey",
            "In a world where color is a luxury, one teen finds a spray-can that paints in actual sunlight.",
            "Hope-punk",
            "Inspirational & Bright",
            StoryLength::Short,
            StoryOrigin::Original,
            "Paint a massive mural on the government plaza, or share the paint secretly with the underground?",
            Mood::Uplifting,
            "https://images.unsplash.com/photo-1550745165-9bc0b252726f?q=80&w=800&auto=format&fit=crop",
            "from-yellow-400 to-green-500",
        ),
        story(
            "m-7",
            "Echoes of the Sun",
            "A lonely AI on a decommissioned satellite spends its days writing poetry about the stars it can no longer see.",
            "Literary Sci-Fi",
            "Poetic & Melancholic",
            StoryLength::Short,
            StoryOrigin::Original,
            "Transmit the poetry into the void one last time, or delete the logs to finally rest in silence?",
            Mood::Melancholic,
            "https://images.unsplash.com/photo-1512820790803-83ca734da794?q=80&w=800&auto=format&fit=crop",
            "from-indigo-800 to-purple-950",
        ),
        story(
            "m-8",
            "Glitch Runner: Velocity",
            "Your neural link is failing. You have 3 minutes to cross the Neo-Tokyo skyline before your consciousness desyncs.",
            "Cyberpunk Action",
            "Adrenaline-Fueled",
            StoryLength::Short,
            StoryOrigin::Original,
            "Take the dangerous shortcut across the gravity-rails, or risk the slower, crowded lower streets?",
            Mood::FastPaced,
            "https://images.unsplash.com/photo-1550100136-e092101726f4?q=80&w=800&auto=format&fit=crop",
            "from-red-500 to-purple-600",
        ),
    ]
}

/// Converts a curated mood story into the canonical book shape so it can be
/// read through the same session pipeline. Pure and idempotent; the id is
/// carried over unchanged so later lookups by id still resolve the story.
///
/// Shelf assignment follows a fixed two-way split on the story's mood:
/// fast-paced and melancholic stories land on the sci-fi shelf, everything
/// else on fantasy. Short stories run 8 chapters, the rest 15.
pub fn book_from_mood_story(story: &MoodStory) -> Book {
    let theme = match story.mood_id {
        Mood::FastPaced | Mood::Melancholic => ShelfTheme::SciFi,
        _ => ShelfTheme::Fantasy,
    };
    let total_chapters = match story.length {
        StoryLength::Short => 8,
        StoryLength::Standard | StoryLength::Long => 15,
    };
    Book {
        id: story.id.clone(),
        title: story.title.clone(),
        author: story.origin.label().to_string(),
        description: story.hook.clone(),
        theme,
        cover_image: story.cover_image.clone(),
        tags: vec![story.genre.clone(), story.tone.clone()],
        vibe: story.tone.clone(),
        read_count: "NEW".to_string(),
        total_chapters,
        reading_level: Some(ReadingLevel::Standard),
        earned_badge: None,
    }
}

/// The combined catalog: built-in books plus user-created ones.
#[derive(Debug, Clone)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    pub fn new(user_books: &[Book]) -> Self {
        let mut books = initial_books();
        books.extend(user_books.iter().cloned());
        Catalog { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Attaches earned badges to completed books by joining the profile's
    /// completed-book ledger against its badge list.
    pub fn annotated(&self, profile: &UserProfile) -> Vec<Book> {
        self.books
            .iter()
            .map(|b| {
                let mut book = b.clone();
                book.earned_badge = profile
                    .completed_book_ids
                    .get(&b.id)
                    .and_then(|badge_id| profile.badges.iter().find(|bd| &bd.id == badge_id))
                    .cloned();
                book
            })
            .collect()
    }
}

/// Groups an already-filtered book list into a shelf.
pub fn shelf<'a>(books: &'a [Book], theme: ShelfTheme) -> Vec<&'a Book> {
    books.iter().filter(|b| b.theme == theme).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let books = initial_books();
        let stories = mood_stories();
        let mut seen = HashSet::new();
        for id in books
            .iter()
            .map(|b| b.id.clone())
            .chain(stories.iter().map(|s| s.id.clone()))
        {
            assert!(seen.insert(id.clone()), "duplicate catalog id {id}");
        }
    }

    #[test]
    fn every_book_has_a_positive_chapter_budget() {
        for b in initial_books() {
            assert!(b.total_chapters >= 1, "{} has no chapters", b.id);
        }
    }

    #[test]
    fn adapter_preserves_story_id() {
        for s in mood_stories() {
            let book = book_from_mood_story(&s);
            assert_eq!(book.id, s.id);
        }
    }

    #[test]
    fn adapter_is_idempotent() {
        let s = &mood_stories()[0];
        assert_eq!(book_from_mood_story(s), book_from_mood_story(s));
    }

    #[test]
    fn adapter_maps_length_to_chapter_budget() {
        let stories = mood_stories();
        let short = stories.iter().find(|s| s.length == StoryLength::Short).unwrap();
        let long = stories.iter().find(|s| s.length == StoryLength::Long).unwrap();
        assert_eq!(book_from_mood_story(short).total_chapters, 8);
        assert_eq!(book_from_mood_story(long).total_chapters, 15);
    }

    #[test]
    fn adapter_shelves_by_mood() {
        let stories = mood_stories();
        let fast = stories.iter().find(|s| s.mood_id == Mood::FastPaced).unwrap();
        let cozy = stories.iter().find(|s| s.mood_id == Mood::Cozy).unwrap();
        assert_eq!(book_from_mood_story(fast).theme, ShelfTheme::SciFi);
        assert_eq!(book_from_mood_story(cozy).theme, ShelfTheme::Fantasy);
    }

    #[test]
    fn annotated_attaches_earned_badges() {
        use crate::domain::{BadgeRarity, UserBadge, UserProfile, UserStats};
        use chrono::NaiveDate;

        let badge = UserBadge {
            id: "b-1".to_string(),
            name: "Noir Shadow".to_string(),
            icon: "🕵️".to_string(),
            rarity: BadgeRarity::Rare,
            unlocked_at: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            book_id: Some("cr-2".to_string()),
        };
        let profile = UserProfile {
            username: "reader".to_string(),
            display_name: "Reader".to_string(),
            bio: String::new(),
            avatar: String::new(),
            reading_preference: Default::default(),
            stats: UserStats::default(),
            badges: vec![badge.clone()],
            recent_activity: vec![],
            completed_book_ids: [("cr-2".to_string(), "b-1".to_string())].into(),
        };

        let catalog = Catalog::new(&[]);
        let annotated = catalog.annotated(&profile);
        let noir = annotated.iter().find(|b| b.id == "cr-2").unwrap();
        assert_eq!(noir.earned_badge.as_ref().map(|b| b.id.as_str()), Some("b-1"));
        let other = annotated.iter().find(|b| b.id == "c-1").unwrap();
        assert!(other.earned_badge.is_none());
    }
}
