//! crates/bookmarkd_core/src/ledger.rs
//!
//! The profile/badge ledger: pure read-modify-write transitions over the
//! user profile. Every update path returns a whole new profile so the
//! caller persists one atomic record and no intermediate state is ever
//! observable.

use crate::domain::{Book, ReadingLevel, UserBadge, UserProfile, UserStats};

/// The fixed completion template surfaced in the activity feed.
pub fn completion_message(book: &Book, badge: &UserBadge) -> String {
    format!("Completed \"{}\" and earned the {} badge!", book.title, badge.name)
}

/// Merges a finished session's `{book, badge}` pair into the profile.
///
/// Re-reads are non-badge-granting: when the book is already in the
/// completed ledger, the badge list, the mapping, and the books-read count
/// are left untouched and only the activity entry is added. A first
/// completion prepends the badge (newest-first), records
/// `completed_book_ids[book.id] = badge.id`, and bumps `books_read`, all in
/// one step so the two never drift.
pub fn finalize(profile: &UserProfile, book: &Book, badge: &UserBadge) -> UserProfile {
    let mut updated = profile.clone();
    let message = completion_message(book, badge);

    if !updated.completed_book_ids.contains_key(&book.id) {
        updated.badges.insert(0, badge.clone());
        updated
            .completed_book_ids
            .insert(book.id.clone(), badge.id.clone());
        updated.stats.books_read += 1;
    }
    updated.recent_activity.insert(0, message);
    updated
}

/// The editable subset of a profile. Fields left `None` keep their value.
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
}

/// Shallow-merges an edit into the profile. Blank strings are treated the
/// same as absent fields so a profile never loses its display name.
pub fn apply_profile_edit(profile: &UserProfile, edit: ProfileEdit) -> UserProfile {
    let mut updated = profile.clone();
    if let Some(name) = edit.display_name.filter(|n| !n.trim().is_empty()) {
        updated.display_name = name;
    }
    if let Some(bio) = edit.bio {
        updated.bio = bio;
    }
    if let Some(avatar) = edit.avatar.filter(|a| !a.trim().is_empty()) {
        updated.avatar = avatar;
    }
    updated
}

/// A first-run profile for a new local user.
pub fn new_profile(username: &str, avatar: &str) -> UserProfile {
    let username = if username.trim().is_empty() { "Reader" } else { username.trim() };
    UserProfile {
        username: username.to_string(),
        display_name: username.to_string(),
        bio: String::new(),
        avatar: avatar.to_string(),
        reading_preference: ReadingLevel::Standard,
        stats: UserStats {
            books_read: 0,
            streak: 0,
            pages_turned: "0".to_string(),
        },
        badges: Vec::new(),
        recent_activity: vec!["Joined BookMark'D!".to_string()],
        completed_book_ids: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BadgeRarity;
    use chrono::NaiveDate;

    fn badge(id: &str, name: &str) -> UserBadge {
        UserBadge {
            id: id.to_string(),
            name: name.to_string(),
            icon: "🏆".to_string(),
            rarity: BadgeRarity::Rare,
            unlocked_at: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            book_id: Some("bk-1".to_string()),
        }
    }

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Author".to_string(),
            description: String::new(),
            theme: crate::domain::ShelfTheme::Fantasy,
            cover_image: String::new(),
            tags: vec![],
            vibe: String::new(),
            read_count: "0".to_string(),
            total_chapters: 10,
            reading_level: None,
            earned_badge: None,
        }
    }

    fn profile_with(books_read: u32) -> UserProfile {
        let mut p = new_profile("luna", "avatar-url");
        p.stats.books_read = books_read;
        p
    }

    #[test]
    fn finalize_updates_every_field_atomically() {
        let profile = profile_with(5);
        let bk = book("bk-1", "The Gilded Crown");
        let bd = badge("b-9", "Star Weaver");

        let updated = finalize(&profile, &bk, &bd);

        assert_eq!(updated.stats.books_read, 6);
        assert_eq!(updated.badges[0].id, "b-9");
        assert_eq!(updated.completed_book_ids.get("bk-1"), Some(&"b-9".to_string()));
        assert_eq!(
            updated.recent_activity[0],
            "Completed \"The Gilded Crown\" and earned the Star Weaver badge!"
        );
        // The input profile is untouched.
        assert_eq!(profile.stats.books_read, 5);
    }

    #[test]
    fn badges_are_ordered_newest_first() {
        let profile = profile_with(0);
        let first = finalize(&profile, &book("bk-1", "One"), &badge("b-1", "First"));
        let second = finalize(&first, &book("bk-2", "Two"), &badge("b-2", "Second"));

        assert_eq!(second.badges[0].id, "b-2");
        assert_eq!(second.badges[1].id, "b-1");
    }

    #[test]
    fn re_reading_a_completed_book_grants_no_second_badge() {
        let profile = profile_with(0);
        let bk = book("bk-1", "One");
        let first = finalize(&profile, &bk, &badge("b-1", "First"));
        let second = finalize(&first, &bk, &badge("b-2", "Second"));

        assert_eq!(second.badges.len(), 1);
        assert_eq!(second.completed_book_ids.get("bk-1"), Some(&"b-1".to_string()));
        assert_eq!(second.stats.books_read, 1);
        // The re-read still shows up in the activity feed.
        assert_eq!(second.recent_activity.len(), first.recent_activity.len() + 1);
    }

    #[test]
    fn every_ledger_value_is_a_valid_badge_id() {
        let profile = profile_with(0);
        let mut current = profile;
        for i in 0..3 {
            let bk = book(&format!("bk-{i}"), "Book");
            let bd = badge(&format!("b-{i}"), "Badge");
            current = finalize(&current, &bk, &bd);
        }
        for badge_id in current.completed_book_ids.values() {
            assert!(current.badges.iter().any(|b| &b.id == badge_id));
        }
    }

    #[test]
    fn profile_edit_merges_only_provided_fields() {
        let profile = new_profile("luna", "old-avatar");
        let updated = apply_profile_edit(
            &profile,
            ProfileEdit {
                display_name: Some("Luna Nova".to_string()),
                bio: Some("Collector of starlight.".to_string()),
                avatar: None,
            },
        );

        assert_eq!(updated.display_name, "Luna Nova");
        assert_eq!(updated.bio, "Collector of starlight.");
        assert_eq!(updated.avatar, "old-avatar");
    }

    #[test]
    fn blank_display_name_keeps_the_existing_one() {
        let profile = new_profile("luna", "avatar");
        let updated = apply_profile_edit(
            &profile,
            ProfileEdit { display_name: Some("   ".to_string()), ..Default::default() },
        );
        assert_eq!(updated.display_name, "luna");
    }

    #[test]
    fn new_profile_defaults_an_empty_username() {
        let profile = new_profile("  ", "avatar");
        assert_eq!(profile.username, "Reader");
        assert_eq!(profile.recent_activity, vec!["Joined BookMark'D!".to_string()]);
    }
}
