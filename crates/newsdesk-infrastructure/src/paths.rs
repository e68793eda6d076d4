//! Path management for newsdesk client-side state.
//!
//! The only durable state this layer keeps is the session snapshot; it lives
//! in a `newsdesk` directory under the platform config directory.

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Path resolution for newsdesk.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/newsdesk/          # Config directory (XDG on Linux/macOS)
/// ├── auth_token               # Persisted session token
/// └── auth_user.json           # Persisted user profile snapshot
/// ```
pub struct NewsdeskPaths;

impl NewsdeskPaths {
    /// Returns the newsdesk configuration directory.
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join("newsdesk"))
            .ok_or(PathError::ConfigDirNotFound)
    }
}
