//! services/app/src/adapters/store.rs
//!
//! This module contains the file-backed adapter for the `ProfileStore`
//! port: two JSON documents under the data directory, one for the user
//! profile and one for the user-created books. Missing files mean a first
//! run; each write replaces the whole document.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use bookmarkd_core::domain::{Book, UserProfile};
use bookmarkd_core::ports::{PortError, PortResult, ProfileStore};

const PROFILE_FILE: &str = "profile.json";
const USER_BOOKS_FILE: &str = "user_books.json";

/// An adapter that persists the profile and user books as JSON files.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    async fn read_optional(&self, path: &Path) -> PortResult<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Unexpected(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn write(&self, name: &str, json: String) -> PortResult<()> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        fs::write(self.path(name), json)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

#[async_trait]
impl ProfileStore for FileStore {
    async fn load_profile(&self) -> PortResult<Option<UserProfile>> {
        match self.read_optional(&self.path(PROFILE_FILE)).await? {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| PortError::MalformedResponse(format!("profile record: {e}"))),
        }
    }

    async fn save_profile(&self, profile: &UserProfile) -> PortResult<()> {
        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.write(PROFILE_FILE, json).await
    }

    async fn delete_profile(&self) -> PortResult<()> {
        match fs::remove_file(self.path(PROFILE_FILE)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    async fn load_user_books(&self) -> PortResult<Vec<Book>> {
        match self.read_optional(&self.path(USER_BOOKS_FILE)).await? {
            None => Ok(Vec::new()),
            Some(text) => serde_json::from_str(&text)
                .map_err(|e| PortError::MalformedResponse(format!("user books record: {e}"))),
        }
    }

    async fn save_user_books(&self, books: &[Book]) -> PortResult<()> {
        let json = serde_json::to_string_pretty(books)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        self.write(USER_BOOKS_FILE, json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmarkd_core::catalog::initial_books;
    use bookmarkd_core::ledger::new_profile;

    #[tokio::test]
    async fn first_run_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.load_profile().await.unwrap().is_none());
        assert!(store.load_user_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let profile = new_profile("luna", "https://example.test/a.svg");
        store.save_profile(&profile).await.unwrap();

        let loaded = store.load_profile().await.unwrap().unwrap();
        assert_eq!(loaded, profile);
    }

    #[tokio::test]
    async fn user_books_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let books = vec![initial_books()[0].clone()];
        store.save_user_books(&books).await.unwrap();

        let loaded = store.load_user_books().await.unwrap();
        assert_eq!(loaded, books);
    }

    #[tokio::test]
    async fn delete_profile_supports_logout_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.save_profile(&new_profile("luna", "a")).await.unwrap();
        store.delete_profile().await.unwrap();
        assert!(store.load_profile().await.unwrap().is_none());
        // Deleting again is not an error.
        store.delete_profile().await.unwrap();
    }

    #[tokio::test]
    async fn corrupted_profile_reports_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join(PROFILE_FILE), "{not json")
            .await
            .unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(
            store.load_profile().await,
            Err(PortError::MalformedResponse(_))
        ));
    }
}
