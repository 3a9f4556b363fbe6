//! services/app/src/bin/bookmarkd.rs
//!
//! The interactive terminal front end. All decisions live in the `App`
//! orchestration layer and the core crate; this binary only reads lines,
//! dispatches commands, and prints the results.

use app_lib::{
    adapters::{FileStore, HttpGenerationAdapter},
    app::avatar_url,
    App, AppError, Config,
};
use bookmarkd_core::domain::{Mood, ReadingLevel, ShelfTheme};
use bookmarkd_core::ledger::ProfileEdit;
use bookmarkd_core::session::Advance;
use clap::Parser;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "bookmarkd", about = "An interactive fiction shelf, read from the terminal.")]
struct Args {
    /// Directory holding the profile and user-book documents.
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Generation backend endpoint, overriding BACKEND_URL.
    #[arg(long)]
    backend_url: Option<String>,
}

type Input = Lines<BufReader<Stdin>>;

async fn ask(lines: &mut Input, prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?.unwrap_or_default().trim().to_string())
}

fn parse_mood(name: &str) -> Option<Mood> {
    match name {
        "all" => Some(Mood::All),
        "cozy" => Some(Mood::Cozy),
        "adventure" => Some(Mood::Adventure),
        "romantic" => Some(Mood::Romantic),
        "dark" => Some(Mood::Dark),
        "mysterious" => Some(Mood::Mysterious),
        "uplifting" => Some(Mood::Uplifting),
        "melancholic" => Some(Mood::Melancholic),
        "fast-paced" => Some(Mood::FastPaced),
        _ => None,
    }
}

fn parse_theme(name: &str) -> Option<ShelfTheme> {
    match name {
        "classics" => Some(ShelfTheme::Classics),
        "sci-fi" => Some(ShelfTheme::SciFi),
        "fantasy" => Some(ShelfTheme::Fantasy),
        "crime" => Some(ShelfTheme::Crime),
        _ => None,
    }
}

fn parse_level(name: &str) -> Option<ReadingLevel> {
    match name {
        "chill" => Some(ReadingLevel::Chill),
        "standard" | "" => Some(ReadingLevel::Standard),
        "academic" => Some(ReadingLevel::Academic),
        _ => None,
    }
}

const HELP: &str = "\
Commands:
  mood <name>     filter by mood (try: moods)
  moods           list the available moods
  shelves         show the shelves under the active mood
  stories         show the curated mood matches
  preview <id>    AI preview for a book
  read <id>       start reading a book
  story <id>      start reading a curated mood story
  create          forge your own story
  profile         show your profile and badges
  edit            edit display name and bio
  logout          sign out and clear the saved profile
  quit            exit";

fn print_discover(app: &App, mood: Mood) {
    let stories = app.mood_story_list(mood);
    if !stories.is_empty() {
        println!("\nHandcrafted Mood Matches");
        for s in &stories {
            println!("  [{}] {} — {} ({})", s.id, s.title, s.genre, s.tone);
        }
    }
    let shelves = app.shelves(mood);
    if mood != Mood::All && shelves.is_empty() && stories.is_empty() {
        println!("\nNo stories matching this specific vibe yet.");
        return;
    }
    for (theme, books) in shelves {
        println!("\n{}", theme.label());
        for b in books {
            let badge = b
                .earned_badge
                .as_ref()
                .map(|bd| format!("  {} {}", bd.icon, bd.name))
                .unwrap_or_default();
            println!(
                "  [{}] {} by {} — {} chapters, {}{}",
                b.id, b.title, b.author, b.total_chapters, b.vibe, badge
            );
        }
    }
}

fn print_chapter(app: &App) {
    let Some(session) = app.session() else { return };
    let Some(chapter) = session.chapter() else { return };
    let book = session.book();
    println!(
        "\n=== {} — chapter {} of {} ===\n",
        book.title,
        session.history().len(),
        book.total_chapters
    );
    println!("{}\n", chapter.content);
    for (i, choice) in chapter.choices.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, choice.text, choice.impact);
    }
}

async fn sign_in_flow(app: &mut App, lines: &mut Input) -> Result<(), AppError> {
    println!("Welcome to BookMark'D — your digital shelf, reimagined.");
    let username = ask(lines, "Choose a username: ").await?;
    let seed = ask(lines, "Avatar seed (blank for default): ").await?;
    let seed = if seed.is_empty() { username.clone() } else { seed };
    app.sign_in(&username, &seed).await?;
    println!("Shelf ready. Type 'help' for commands.");
    Ok(())
}

async fn reading_loop(
    app: &mut App,
    lines: &mut Input,
    mut outcome: Advance,
) -> Result<(), AppError> {
    loop {
        print_chapter(app);
        if outcome == Advance::Finished {
            if let Some((book, badge)) = app.claim_badge().await? {
                println!(
                    "\n{} You finished \"{}\" and earned the {} badge ({:?})!",
                    badge.icon, book.title, badge.name, badge.rarity
                );
            }
            return Ok(());
        }
        let input = ask(lines, "\nchoice # (or 'define <word>', 'exit'): ").await?;
        if input == "exit" {
            app.exit_reading();
            println!("Left the story. Your shelf is where you left it.");
            return Ok(());
        }
        if let Some(word) = input.strip_prefix("define ") {
            match app.define(word.trim()).await {
                Some(d) => println!("{}: {} (e.g. {})", word.trim(), d.definition, d.example),
                None => println!("No definition available."),
            }
            continue;
        }
        let picked = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| {
                app.session()
                    .and_then(|s| s.chapter())
                    .and_then(|c| c.choices.get(i))
                    .map(|c| c.text.clone())
            });
        match picked {
            Some(text) => outcome = app.choose(&text).await?,
            None => println!("Pick one of the numbered choices."),
        }
    }
}

async fn create_flow(app: &mut App, lines: &mut Input) -> Result<Option<String>, AppError> {
    let title = ask(lines, "Title: ").await?;
    if title.is_empty() {
        println!("A story needs a title.");
        return Ok(None);
    }
    let theme = loop {
        let input = ask(lines, "Shelf (classics/sci-fi/fantasy/crime): ").await?;
        if let Some(theme) = parse_theme(&input) {
            break theme;
        }
        println!("Pick one of the four shelves.");
    };
    let level = loop {
        let input = ask(lines, "Reading level (chill/standard/academic): ").await?;
        if let Some(level) = parse_level(&input) {
            break level;
        }
        println!("Pick chill, standard, or academic.");
    };
    let premise = ask(lines, "Premise: ").await?;
    let id = app.create_story(&title, theme, level, &premise).await?;
    println!("Created [{id}].");
    Ok(Some(id))
}

fn print_profile(app: &App) {
    let Some(profile) = app.profile() else { return };
    println!("\n{} (@{})", profile.display_name, profile.username);
    if !profile.bio.is_empty() {
        println!("{}", profile.bio);
    }
    println!(
        "Books read: {}  Streak: {}  Pages turned: {}",
        profile.stats.books_read, profile.stats.streak, profile.stats.pages_turned
    );
    if !profile.badges.is_empty() {
        println!("Badges:");
        for b in &profile.badges {
            println!("  {} {} ({:?}, {})", b.icon, b.name, b.rarity, b.unlocked_at);
        }
    }
    if !profile.recent_activity.is_empty() {
        println!("Recent activity:");
        for a in profile.recent_activity.iter().take(5) {
            println!("  - {a}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let args = Args::parse();
    let mut config = Config::from_env()?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(url) = args.backend_url {
        config.backend_url = url;
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(backend = %config.backend_url, "Configuration loaded. Starting BookMark'D...");

    // --- 2. Initialize Service Adapters ---
    let store = Arc::new(FileStore::new(config.data_dir.clone()));
    let generator = Arc::new(HttpGenerationAdapter::new(&config)?);

    // --- 3. Load the Application State ---
    let mut app = App::load(store, generator).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if app.profile().is_none() {
        sign_in_flow(&mut app, &mut lines).await?;
    } else if let Some(profile) = app.profile() {
        println!("Welcome back, {}. Type 'help' for commands.", profile.display_name);
    }

    let mut active_mood = Mood::All;
    print_discover(&app, active_mood);

    // --- 4. Command Loop ---
    loop {
        let input = ask(&mut lines, "\n> ").await?;
        let (command, rest) = input.split_once(' ').unwrap_or((input.as_str(), ""));
        match command {
            "" => {}
            "help" => println!("{HELP}"),
            "moods" => println!(
                "all cozy adventure romantic dark mysterious uplifting melancholic fast-paced"
            ),
            "mood" => match parse_mood(rest.trim()) {
                Some(mood) => {
                    active_mood = mood;
                    print_discover(&app, active_mood);
                }
                None => println!("Unknown mood. Try 'moods'."),
            },
            "shelves" | "stories" => print_discover(&app, active_mood),
            "preview" => match app.preview(rest.trim()).await {
                Ok(preview) => {
                    println!("\n{}", preview.summary);
                    println!("Plot twist: {}", preview.plot_twist);
                    println!("{}", preview.vibe_rating);
                }
                Err(e) => println!("{e}"),
            },
            "read" => match app.start_reading(rest.trim()).await {
                Ok(outcome) => reading_loop(&mut app, &mut lines, outcome).await?,
                Err(e) => println!("{e}"),
            },
            "story" => match app.start_mood_story(rest.trim()).await {
                Ok(outcome) => reading_loop(&mut app, &mut lines, outcome).await?,
                Err(e) => println!("{e}"),
            },
            "create" => {
                if let Some(id) = create_flow(&mut app, &mut lines).await? {
                    let now = ask(&mut lines, "Read it now? (y/n): ").await?;
                    if now.eq_ignore_ascii_case("y") {
                        match app.start_reading(&id).await {
                            Ok(outcome) => reading_loop(&mut app, &mut lines, outcome).await?,
                            Err(e) => println!("{e}"),
                        }
                    }
                }
            }
            "profile" => print_profile(&app),
            "edit" => {
                let display_name = ask(&mut lines, "Display name (blank to keep): ").await?;
                let bio = ask(&mut lines, "Bio (blank to keep): ").await?;
                let avatar_seed = ask(&mut lines, "Avatar seed (blank to keep): ").await?;
                let edit = ProfileEdit {
                    display_name: (!display_name.is_empty()).then_some(display_name),
                    bio: (!bio.is_empty()).then_some(bio),
                    avatar: (!avatar_seed.is_empty()).then(|| avatar_url(&avatar_seed)),
                };
                app.edit_profile(edit).await?;
                println!("Profile updated.");
            }
            "logout" => {
                app.sign_out().await?;
                sign_in_flow(&mut app, &mut lines).await?;
            }
            "quit" | "exit" => break,
            _ => println!("Unknown command. Type 'help'."),
        }
    }

    Ok(())
}
