//! Session domain models.
//!
//! A session is created by completing the two-factor login flow, survives a
//! process restart through the persisted snapshot, and is destroyed by an
//! explicit logout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NewsdeskError, Result};

/// Publication permissions attached to a user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permissions {
    /// Ids of the publications the user may act on.
    #[serde(default)]
    pub allowed_publication_ids: Vec<i64>,
}

/// The authenticated staff member.
///
/// `username` is required: every content-API call is keyed by author
/// username.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Permissions,
}

impl UserProfile {
    /// Builds a profile from the raw user payload returned by the
    /// verify-token endpoint.
    ///
    /// The display name falls back through `display_name`, then
    /// `"{first_name} {last_name}"`, then `username`. The role is always
    /// `"editor"`; the upstream payload carries no role information.
    pub fn from_raw(raw: &Value) -> Result<Self> {
        let id = raw
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| NewsdeskError::malformed("user payload has no numeric id"))?;
        let username = non_empty_str(raw, "username")
            .ok_or_else(|| NewsdeskError::malformed("user payload has no username"))?;

        let first_last = format!(
            "{} {}",
            non_empty_str(raw, "first_name").unwrap_or_default(),
            non_empty_str(raw, "last_name").unwrap_or_default()
        )
        .trim()
        .to_string();

        let name = non_empty_str(raw, "display_name")
            .filter(|name| !name.is_empty())
            .or_else(|| (!first_last.is_empty()).then_some(first_last))
            .unwrap_or_else(|| username.clone());

        Ok(Self {
            id,
            name,
            email: non_empty_str(raw, "email").unwrap_or_default(),
            username,
            role: "editor".to_string(),
            permissions: Permissions::default(),
        })
    }

    /// Uppercase first letters of each whitespace-separated name token.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|token| token.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

fn non_empty_str(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// In-memory session state.
///
/// Invariant: the session is authenticated iff both `user` and `token` are
/// set.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub last_activity: DateTime<Utc>,
    pub is_locked: bool,
    pub allowed_publication_ids: Vec<i64>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            user: None,
            token: None,
            last_activity: Utc::now(),
            is_locked: false,
            allowed_publication_ids: Vec::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// The persisted form of a session: exactly the token and the user profile
/// (with its embedded permissions). The snapshot is the sole source of truth
/// on process start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub token: String,
    pub user: UserProfile,
}
