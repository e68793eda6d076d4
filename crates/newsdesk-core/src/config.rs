//! Remote CMS endpoint configuration.
//!
//! The state layer talks to exactly one upstream: the CMS HTTP API. The only
//! configurable value is its base URL, resolved from the environment with a
//! production default.

use serde::{Deserialize, Serialize};
use std::env;

/// Default CMS base URL used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://cms-vgad.visiongroup.co.ug";

/// Environment variable consulted by [`CmsConfig::from_env`].
pub const BASE_URL_ENV: &str = "NEWSDESK_CMS_URL";

/// Configuration for the remote CMS API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CmsConfig {
    /// Base URL of the CMS, without a trailing slash.
    pub base_url: String,
}

impl CmsConfig {
    /// Creates a configuration pointing at the given base URL.
    ///
    /// A trailing slash is stripped so endpoint paths can always be joined
    /// with a single `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Loads configuration from the `NEWSDESK_CMS_URL` environment variable.
    ///
    /// Falls back to [`DEFAULT_BASE_URL`] when the variable is unset or empty.
    pub fn from_env() -> Self {
        match env::var(BASE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let config = CmsConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let config = CmsConfig::new("https://cms.example.com/");
        assert_eq!(config.base_url, "https://cms.example.com");
    }

    #[test]
    fn test_endpoint_join() {
        let config = CmsConfig::new("https://cms.example.com");
        assert_eq!(
            config.endpoint("/api/posts/save"),
            "https://cms.example.com/api/posts/save"
        );
        assert_eq!(
            config.endpoint("api/posts/save"),
            "https://cms.example.com/api/posts/save"
        );
    }
}
