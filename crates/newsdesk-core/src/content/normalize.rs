//! Article normalization.
//!
//! Upstream field names and shapes have varied across CMS revisions
//! (`excerpt` vs `summary`, `wp_published_at` vs `publishedAt`, nested
//! `featured_image` objects vs flat `featuredImage` URLs, authors as object
//! arrays, id arrays or a single object). Every reader of article data goes
//! through [`normalize_article`], which accepts all of them and produces the
//! canonical [`Article`] shape. When both an old and a new spelling are
//! present, the newer one wins.

use serde_json::Value;

use crate::content::model::{Article, ArticleStatus, Author};

/// First present, non-null value among `keys`.
fn pick<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|value| !value.is_null())
}

fn pick_str(raw: &Value, keys: &[&str]) -> Option<String> {
    pick(raw, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn pick_i64(raw: &Value, keys: &[&str]) -> Option<i64> {
    let value = pick(raw, keys)?;
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// Booleans have arrived as true/false, 0/1 and "0"/"1".
fn pick_bool(raw: &Value, keys: &[&str]) -> bool {
    match pick(raw, keys) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => s == "1" || s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// A URL that may be a bare string or an object with a `url`/`src` field.
fn image_url(value: &Value) -> Option<String> {
    match value {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(_) => pick_str(value, &["url", "src"]),
        _ => None,
    }
}

/// A name that may be a bare string or a category/tag object.
fn label(value: &Value) -> Option<String> {
    match value {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        Value::Object(_) => pick_str(value, &["name", "slug"]),
        _ => None,
    }
}

/// Author references: an array of objects, an array of ids, a single object
/// or a single id. Anything else is no authors.
fn author_ids(raw: &Value) -> Vec<i64> {
    let value = match pick(raw, &["authors", "author_ids", "author"]) {
        Some(value) => value,
        None => return Vec::new(),
    };
    let one = |entry: &Value| -> Option<i64> {
        entry
            .as_i64()
            .or_else(|| entry.get("id").and_then(Value::as_i64))
    };
    match value {
        Value::Array(entries) => entries.iter().filter_map(one).collect(),
        other => one(other).into_iter().collect(),
    }
}

fn publication_id(raw: &Value) -> Option<i64> {
    pick_i64(raw, &["publicationId", "publication_id"]).or_else(|| {
        raw.get("publication")
            .and_then(|p| p.get("id"))
            .and_then(Value::as_i64)
    })
}

fn tags(raw: &Value) -> Vec<String> {
    match pick(raw, &["tags"]) {
        Some(Value::Array(entries)) => entries.iter().filter_map(label).collect(),
        _ => Vec::new(),
    }
}

fn album(raw: &Value) -> Vec<String> {
    match pick(raw, &["album", "gallery"]) {
        Some(Value::Array(entries)) => entries.iter().filter_map(image_url).collect(),
        _ => Vec::new(),
    }
}

/// Maps one raw upstream record to the canonical article shape.
///
/// Missing optional fields default type-appropriately (`false`, `None`,
/// `[]`, `0`); `author_ids` is always an array. The untouched record is
/// retained on the result.
pub fn normalize_article(raw: Value) -> Article {
    Article {
        id: pick_i64(&raw, &["id"]).unwrap_or(0),
        title: pick_str(&raw, &["title"]).unwrap_or_default(),
        slug: pick_str(&raw, &["slug"]).unwrap_or_default(),
        status: pick_str(&raw, &["status", "post_status"])
            .map(|s| ArticleStatus::parse(&s))
            .unwrap_or_default(),
        category: pick(&raw, &["category", "primary_category"]).and_then(label),
        secondary_category: pick(&raw, &["secondaryCategory", "secondary_category"])
            .and_then(label),
        author_ids: author_ids(&raw),
        publication_id: publication_id(&raw),
        published_at: pick_str(&raw, &["publishedAt", "published_at", "wp_published_at"]),
        live: pick_bool(&raw, &["live", "is_live"]),
        featured: pick_bool(&raw, &["featured", "is_featured"]),
        breaking_news: pick_bool(&raw, &["breakingNews", "breaking_news"]),
        breaking_duration: pick_i64(&raw, &["breakingDuration", "breaking_duration"]).unwrap_or(0),
        premium: pick_bool(&raw, &["premium", "is_premium"]),
        tags: tags(&raw),
        summary: pick_str(&raw, &["summary", "excerpt"]),
        content: pick_str(&raw, &["content", "body"]),
        featured_image: pick(&raw, &["featuredImage", "featured_image"]).and_then(image_url),
        album: album(&raw),
        created_at: pick_str(&raw, &["createdAt", "created_at"]),
        updated_at: pick_str(&raw, &["updatedAt", "updated_at"]),
        views: pick_i64(&raw, &["views", "view_count"]).unwrap_or(0),
        raw,
    }
}

/// Derives the author list from a set of normalized articles.
///
/// Authors are read from each article's retained raw record, keyed by id,
/// first occurrence wins; order follows the article list.
pub fn extract_authors(articles: &[Article]) -> Vec<Author> {
    let mut seen = std::collections::HashSet::new();
    let mut authors = Vec::new();

    for article in articles {
        let entries = match article.raw.get("authors").and_then(Value::as_array) {
            Some(entries) => entries,
            None => continue,
        };
        for entry in entries {
            let id = match entry.get("id").and_then(Value::as_i64) {
                Some(id) => id,
                None => continue,
            };
            if !seen.insert(id) {
                continue;
            }
            let username = pick_str(entry, &["username"]).unwrap_or_default();
            authors.push(Author {
                id,
                name: pick_str(entry, &["display_name", "displayName"])
                    .unwrap_or_else(|| username.clone()),
                slug: username.clone(),
                username,
                email: pick_str(entry, &["email"]),
                first_name: pick_str(entry, &["first_name", "firstName"]),
                last_name: pick_str(entry, &["last_name", "lastName"]),
                bio: pick_str(entry, &["bio"]).unwrap_or_else(|| "n/a".to_string()),
            });
        }
    }

    authors
}
