//! Content domain models: publications, categories, authors, articles.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ImageAttachment;

/// A publication the newsroom writes for. Read-only from this side; the
/// remote CMS is the source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Publication {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A category, flattened out of its owning publication's payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub publication_id: i64,
}

/// An author, derived by de-duplicating the author references embedded in
/// fetched articles. Never fetched directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    /// Display name, falling back to the username.
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// The author's URL slug (their username).
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub bio: String,
}

/// Publication status of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
    Deleted,
}

impl ArticleStatus {
    /// Parses an upstream status string; anything unrecognized is a draft.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "published" | "publish" => Self::Published,
            "deleted" | "trash" => Self::Deleted,
            _ => Self::Draft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Deleted => "deleted",
        }
    }
}

/// The canonical article shape every upstream record normalizes into.
///
/// `raw` retains the untouched upstream record for fields this layer does
/// not model yet (author extraction also reads it). `status` and `live` are
/// independent; neither is derived from the other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub status: ArticleStatus,
    pub category: Option<String>,
    pub secondary_category: Option<String>,
    /// Always an array after normalization, never null.
    pub author_ids: Vec<i64>,
    pub publication_id: Option<i64>,
    pub published_at: Option<String>,
    pub live: bool,
    pub featured: bool,
    pub breaking_news: bool,
    /// Hours the breaking-news banner stays up. Zero when not breaking.
    pub breaking_duration: i64,
    pub premium: bool,
    pub tags: Vec<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub album: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub views: i64,
    /// The raw upstream record this article was normalized from.
    pub raw: Value,
}

/// Metadata for a new article submission.
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub title: String,
    pub slug: Option<String>,
    pub status: ArticleStatus,
    pub category: Option<String>,
    pub secondary_category: Option<String>,
    pub publication_id: Option<i64>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub live: bool,
    pub featured: bool,
    pub breaking_news: bool,
    pub breaking_duration: i64,
    pub premium: bool,
    /// Submitted as a binary multipart part, not inline data.
    pub featured_image: Option<ImageAttachment>,
    pub album: Vec<ImageAttachment>,
}

/// An update carries the same field set as a create; the target id travels
/// separately.
pub type ArticlePatch = ArticleDraft;

impl ArticleDraft {
    /// Serializes the structured metadata for the save endpoint's `data`
    /// field. `id` is present only for updates.
    pub fn to_metadata(&self, author_username: &str, id: Option<i64>) -> Value {
        let mut data = serde_json::json!({
            "title": self.title,
            "slug": self.slug,
            "status": self.status.as_str(),
            "category": self.category,
            "secondaryCategory": self.secondary_category,
            "publicationId": self.publication_id,
            "summary": self.summary,
            "content": self.content,
            "tags": self.tags,
            "live": self.live,
            "featured": self.featured,
            "breakingNews": self.breaking_news,
            "breakingDuration": self.breaking_duration,
            "premium": self.premium,
            "author": author_username,
        });
        if let Some(id) = id {
            data["id"] = serde_json::json!(id);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_is_tolerant() {
        assert_eq!(ArticleStatus::parse("published"), ArticleStatus::Published);
        assert_eq!(ArticleStatus::parse("Publish"), ArticleStatus::Published);
        assert_eq!(ArticleStatus::parse("deleted"), ArticleStatus::Deleted);
        assert_eq!(ArticleStatus::parse("draft"), ArticleStatus::Draft);
        assert_eq!(ArticleStatus::parse("pending"), ArticleStatus::Draft);
    }

    #[test]
    fn test_draft_metadata_includes_id_only_for_updates() {
        let draft = ArticleDraft {
            title: "Hello".to_string(),
            ..ArticleDraft::default()
        };
        let create = draft.to_metadata("jdoe", None);
        assert!(create.get("id").is_none());
        assert_eq!(create["author"], "jdoe");
        assert_eq!(create["status"], "draft");

        let update = draft.to_metadata("jdoe", Some(42));
        assert_eq!(update["id"], 42);
    }
}
