//! File-backed session snapshot storage.
//!
//! The Rust rendition of the browser's two localStorage keys: the token and
//! the serialized user profile are stored under two named files in the
//! platform config directory, read once at startup and erased on logout.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::paths::NewsdeskPaths;
use newsdesk_core::error::{NewsdeskError, Result};
use newsdesk_core::session::{SessionSnapshot, SnapshotRepository, UserProfile};

const TOKEN_FILE: &str = "auth_token";
const USER_FILE: &str = "auth_user.json";

/// Durable snapshot repository storing `auth_token` and `auth_user.json`
/// under a directory.
///
/// Corrupt or half-written content surfaces as
/// [`NewsdeskError::PersistedState`]; the session store reacts by clearing
/// and starting unauthenticated.
pub struct FileSnapshotRepository {
    dir: PathBuf,
}

impl FileSnapshotRepository {
    /// Creates a repository rooted at the default platform config directory.
    pub fn new() -> Result<Self> {
        let dir = NewsdeskPaths::config_dir()
            .map_err(|err| NewsdeskError::config(err.to_string()))?;
        Ok(Self { dir })
    }

    /// Creates a repository rooted at a custom directory (for testing).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }
}

async fn read_optional(path: &PathBuf) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn remove_if_present(path: &PathBuf) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl SnapshotRepository for FileSnapshotRepository {
    async fn load(&self) -> Result<Option<SessionSnapshot>> {
        let token = read_optional(&self.token_path()).await?;
        let user = read_optional(&self.user_path()).await?;

        // A session only restores when both keys are present.
        let (token, user) = match (token, user) {
            (Some(token), Some(user)) => (token, user),
            _ => return Ok(None),
        };

        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(NewsdeskError::persisted_state("stored token is empty"));
        }

        let user: UserProfile = serde_json::from_str(&user).map_err(|err| {
            NewsdeskError::persisted_state(format!("stored user profile unreadable: {err}"))
        })?;

        debug!(username = %user.username, "session snapshot loaded");
        Ok(Some(SessionSnapshot { token, user }))
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.token_path(), &snapshot.token).await?;
        fs::write(self.user_path(), serde_json::to_string(&snapshot.user)?).await?;
        debug!("session snapshot saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        remove_if_present(&self.token_path()).await?;
        remove_if_present(&self.user_path()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn snapshot() -> SessionSnapshot {
        let user = UserProfile::from_raw(&json!({
            "id": 7,
            "username": "jdoe",
            "email": "jdoe@example.com",
            "display_name": "Jane Doe",
        }))
        .unwrap();
        SessionSnapshot {
            token: "session-abc".to_string(),
            user,
        }
    }

    #[tokio::test]
    async fn test_load_empty_dir_is_none() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::with_dir(dir.path());
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::with_dir(dir.path());

        repo.save(&snapshot()).await.unwrap();
        let loaded = repo.load().await.unwrap().unwrap();
        assert_eq!(loaded, snapshot());
    }

    #[tokio::test]
    async fn test_missing_user_file_is_none() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "session-abc").unwrap();

        let repo = FileSnapshotRepository::with_dir(dir.path());
        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_user_file_is_persisted_state_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "session-abc").unwrap();
        std::fs::write(dir.path().join(USER_FILE), "{ not json").unwrap();

        let repo = FileSnapshotRepository::with_dir(dir.path());
        let err = repo.load().await.unwrap_err();
        assert!(err.is_persisted_state());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::with_dir(dir.path());

        repo.save(&snapshot()).await.unwrap();
        repo.clear().await.unwrap();
        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());
    }
}
