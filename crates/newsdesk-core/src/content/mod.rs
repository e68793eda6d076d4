//! Remote content cache: publications, categories, authors, articles.

pub mod model;
pub mod normalize;
pub mod store;

pub use model::{
    Article, ArticleDraft, ArticlePatch, ArticleStatus, Author, Category, Publication,
};
pub use normalize::{extract_authors, normalize_article};
pub use store::{ContentStore, DateRange, UserScope, ERROR_TTL_SECONDS};
