//! The seam between the state stores and the remote CMS.
//!
//! `CmsApi` abstracts every HTTP call the stores make, so the stores can be
//! exercised against in-process fakes while production wires in the reqwest
//! implementation from `newsdesk-infrastructure`.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Decoded response of the initiate-login endpoint.
///
/// Upstream answers `{success, userId}` on acceptance and `{error:{message}}`
/// on rejection; implementations collapse both into this struct rather than
/// erroring on the rejection payload, because "wrong password" is an expected
/// outcome for the login flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiateLogin {
    pub success: bool,
    pub user_id: Option<i64>,
    /// Upstream failure detail. Logged, never shown to users.
    pub message: Option<String>,
}

/// Decoded response of the verify-token endpoint.
///
/// The `user` payload stays raw: its shape has drifted across API revisions
/// and the profile normalizer in the session module owns its interpretation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyToken {
    pub success: bool,
    pub user: Option<Value>,
    pub message: Option<String>,
}

/// A category as embedded in the publications-by-author payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A publication as returned by the publications-by-author endpoint,
/// with its nested categories still attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPublication {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<RawCategory>,
}

/// The articles endpoint has shipped three wire shapes over its lifetime:
/// a bare array, `{articles: [...]}`, and `{data: {articles: [...]}}` (or
/// `{data: [...]}`). This union decodes all of them exactly once at the API
/// boundary; everything downstream sees a flat record list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArticlesPayload {
    /// The oldest shape: a bare JSON array of article records.
    Bare(Vec<Value>),
    /// `{articles: [...]}`.
    Wrapped { articles: Vec<Value> },
    /// `{data: {articles: [...]}}` or `{data: [...]}`.
    DataWrapped { data: ArticlesData },
    /// Anything else. Flattens to an empty list, not an error.
    Unknown(Value),
}

/// The body of the `data` field in the double-wrapped shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArticlesData {
    Wrapped { articles: Vec<Value> },
    Bare(Vec<Value>),
}

impl ArticlesPayload {
    /// Flattens any wire shape into the raw article records it carries.
    pub fn into_articles(self) -> Vec<Value> {
        match self {
            Self::Bare(articles) => articles,
            Self::Wrapped { articles } => articles,
            Self::DataWrapped {
                data: ArticlesData::Wrapped { articles },
            } => articles,
            Self::DataWrapped {
                data: ArticlesData::Bare(articles),
            } => articles,
            Self::Unknown(_) => Vec::new(),
        }
    }
}

/// An image file attached to an article submission.
///
/// Carries the bytes directly; the transport decides how to encode them
/// (the production client sends them as binary multipart parts).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A create/update request for the save endpoint: structured metadata plus
/// optional binary attachments.
#[derive(Debug, Clone)]
pub struct ArticleSubmission {
    /// Serialized article metadata, sent as the multipart `data` field.
    pub data: Value,
    /// Featured image, sent as `files.featuredImage` when present.
    pub featured_image: Option<ImageAttachment>,
    /// Album images, each sent as a `files.album` part.
    pub album: Vec<ImageAttachment>,
}

/// Client interface to the remote CMS API.
///
/// All calls run to completion or failure; this layer imposes no timeout and
/// supports no cancellation (that is the transport's business).
#[async_trait]
pub trait CmsApi: Send + Sync {
    /// `GET /api/authors/initiate-login/{email}/{password}`.
    async fn initiate_login(&self, email: &str, password: &str) -> Result<InitiateLogin>;

    /// `POST /api/authors/verify-token` with `{email, token}`.
    async fn verify_token(&self, email: &str, code: &str) -> Result<VerifyToken>;

    /// `POST /api/authors/resend-token` with `{email}`. Returns the
    /// upstream `success` flag.
    async fn resend_token(&self, email: &str) -> Result<bool>;

    /// `GET /api/publications/author/{username}/call`. A missing or
    /// malformed `publications` field decodes to an empty list.
    async fn publications_by_author(&self, username: &str) -> Result<Vec<RawPublication>>;

    /// `GET /api/posts/author/{username}/{start}/{end}` (dates as
    /// `YYYY-MM-DD`), decoded into [`ArticlesPayload`].
    async fn articles_by_author(
        &self,
        username: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ArticlesPayload>;

    /// `POST /api/posts/save` as a multipart submission. Returns the full
    /// article record echoed by the server.
    async fn save_article(&self, submission: ArticleSubmission) -> Result<Value>;
}
