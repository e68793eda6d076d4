//! Content state container.
//!
//! Caches publications, categories, authors and articles sourced from the
//! remote CMS and submits article create/update requests. Collections are
//! replaced wholesale on fetch; overlapping in-flight operations are not
//! isolated (last write wins), and the loading flag is an advisory UI
//! signal, not a mutual-exclusion gate.

use chrono::{DateTime, Months, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::api::{ArticleSubmission, CmsApi};
use crate::content::model::{Article, ArticleDraft, ArticlePatch, Author, Category, Publication};
use crate::content::normalize::{extract_authors, normalize_article};
use crate::error::Result;
use crate::session::SessionStore;

/// Seconds a transient error stays visible before it expires.
pub const ERROR_TTL_SECONDS: i64 = 5;

/// An inclusive date window for article queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The default query window: the six months ending on `end`.
    pub fn six_months_ending(end: NaiveDate) -> Self {
        let start = end.checked_sub_months(Months::new(6)).unwrap_or(end);
        Self { start, end }
    }
}

/// The publications and flattened categories a user may act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScope {
    pub publications: Vec<Publication>,
    pub categories: Vec<Category>,
}

struct TransientError {
    message: String,
    set_at: DateTime<Utc>,
}

#[derive(Default)]
struct ContentState {
    publications: Vec<Publication>,
    categories: Vec<Category>,
    authors: Vec<Author>,
    articles: Vec<Article>,
    current_publication: Option<Publication>,
    is_loading: bool,
    error: Option<TransientError>,
}

/// State container for remote content.
pub struct ContentStore {
    api: Arc<dyn CmsApi>,
    session: Arc<SessionStore>,
    state: Mutex<ContentState>,
}

impl ContentStore {
    pub fn new(api: Arc<dyn CmsApi>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(ContentState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ContentState> {
        self.state.lock().expect("content state lock poisoned")
    }

    fn set_loading(&self, loading: bool) {
        self.lock().is_loading = loading;
    }

    fn set_error(&self, message: impl Into<String>) {
        self.lock().error = Some(TransientError {
            message: message.into(),
            set_at: Utc::now(),
        });
    }

    /// The current transient error, if one was set within the last
    /// [`ERROR_TTL_SECONDS`] seconds.
    pub fn error(&self) -> Option<String> {
        self.error_as_of(Utc::now())
    }

    /// [`error`](Self::error) with an injected clock.
    pub fn error_as_of(&self, now: DateTime<Utc>) -> Option<String> {
        let state = self.lock();
        state.error.as_ref().and_then(|err| {
            ((now - err.set_at).num_seconds() < ERROR_TTL_SECONDS).then(|| err.message.clone())
        })
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    /// Fetches the authenticated user's publications and flattens their
    /// nested categories, replacing both caches wholesale.
    pub async fn load_user_scope(&self) -> Result<UserScope> {
        let username = self.session.current_username()?;
        self.set_loading(true);
        debug!(username, "loading user scope");

        let result = self.api.publications_by_author(&username).await;
        self.set_loading(false);

        let raw_publications = result.map_err(|err| {
            self.set_error(err.user_message());
            err
        })?;

        let mut publications = Vec::with_capacity(raw_publications.len());
        let mut categories = Vec::new();
        for raw in raw_publications {
            for category in &raw.categories {
                categories.push(Category {
                    id: category.id,
                    name: category.name.clone(),
                    slug: category.slug.clone(),
                    description: category.description.clone(),
                    publication_id: raw.id,
                });
            }
            publications.push(Publication {
                id: raw.id,
                name: raw.name,
                slug: raw.slug,
                description: raw.description,
            });
        }

        info!(
            publications = publications.len(),
            categories = categories.len(),
            "user scope loaded"
        );

        let scope = UserScope {
            publications: publications.clone(),
            categories: categories.clone(),
        };
        {
            let mut state = self.lock();
            state.publications = publications;
            state.categories = categories;
        }
        Ok(scope)
    }

    /// Fetches and normalizes the articles authored by `username` within the
    /// given window (default: the six months ending today), replacing the
    /// article and author caches wholesale.
    pub async fn load_articles(
        &self,
        username: &str,
        range: Option<DateRange>,
    ) -> Result<Vec<Article>> {
        let range = range.unwrap_or_else(|| DateRange::six_months_ending(Utc::now().date_naive()));
        self.set_loading(true);
        debug!(username, start = %range.start, end = %range.end, "loading articles");

        let result = self
            .api
            .articles_by_author(username, range.start, range.end)
            .await;
        self.set_loading(false);

        let payload = result.map_err(|err| {
            self.set_error(err.user_message());
            err
        })?;

        let articles: Vec<Article> = payload
            .into_articles()
            .into_iter()
            .map(normalize_article)
            .collect();
        let authors = extract_authors(&articles);
        info!(
            articles = articles.len(),
            authors = authors.len(),
            "articles loaded"
        );

        {
            let mut state = self.lock();
            state.articles = articles.clone();
            state.authors = authors;
        }
        Ok(articles)
    }

    /// Submits a new article and prepends the normalized result to the
    /// cache, then refreshes the full list from the server to pick up
    /// server-side derived fields and ordering.
    pub async fn create_article(&self, draft: ArticleDraft) -> Result<Article> {
        let username = self.session.current_username()?;
        let article = self.save(&draft, &username, None).await?;

        {
            let mut state = self.lock();
            state.articles.insert(0, article.clone());
            merge_new_authors(&mut state.authors, &article);
        }

        self.refresh_after_save(&username).await;
        Ok(article)
    }

    /// Submits an update for `id`. The cached article is replaced in place;
    /// if it is not cached (not expected in normal operation) the result is
    /// prepended instead.
    pub async fn update_article(&self, id: i64, patch: ArticlePatch) -> Result<Article> {
        let username = self.session.current_username()?;
        let article = self.save(&patch, &username, Some(id)).await?;

        {
            let mut state = self.lock();
            match state.articles.iter_mut().find(|a| a.id == id) {
                Some(slot) => *slot = article.clone(),
                None => state.articles.insert(0, article.clone()),
            }
            merge_new_authors(&mut state.authors, &article);
        }

        self.refresh_after_save(&username).await;
        Ok(article)
    }

    async fn save(
        &self,
        draft: &ArticleDraft,
        username: &str,
        id: Option<i64>,
    ) -> Result<Article> {
        self.set_loading(true);
        let submission = ArticleSubmission {
            data: draft.to_metadata(username, id),
            featured_image: draft.featured_image.clone(),
            album: draft.album.clone(),
        };
        let result = self.api.save_article(submission).await;
        self.set_loading(false);

        match result {
            Ok(raw) => Ok(normalize_article(raw)),
            Err(err) => {
                // Upstream detail goes to the UI verbatim for saves.
                self.set_error(err.user_message());
                Err(err)
            }
        }
    }

    /// Best-effort full refetch after a save; failures land in the transient
    /// error slot and the optimistic cache entry stands.
    async fn refresh_after_save(&self, username: &str) {
        if let Err(err) = self.load_articles(username, None).await {
            warn!(error = %err, "post-save refresh failed");
        }
    }

    /// Selects the publication the derived views filter by.
    pub fn set_current_publication(&self, publication: Option<Publication>) {
        self.lock().current_publication = publication;
    }

    pub fn current_publication(&self) -> Option<Publication> {
        self.lock().current_publication.clone()
    }

    /// Refreshes the author-scoped article list, then returns the slice
    /// belonging to `publication_id`.
    pub async fn load_articles_for_publication(
        &self,
        publication_id: i64,
    ) -> Result<Vec<Article>> {
        let username = self.session.current_username()?;
        let articles = self.load_articles(&username, None).await?;
        Ok(articles
            .into_iter()
            .filter(|article| article.publication_id == Some(publication_id))
            .collect())
    }

    /// Cached articles for the selected publication, or all cached articles
    /// when none is selected.
    pub fn articles_for_current_publication(&self) -> Vec<Article> {
        let state = self.lock();
        match &state.current_publication {
            Some(publication) => state
                .articles
                .iter()
                .filter(|article| article.publication_id == Some(publication.id))
                .cloned()
                .collect(),
            None => state.articles.clone(),
        }
    }

    /// Cached categories for the selected publication, or all when none is
    /// selected.
    pub fn categories_for_current_publication(&self) -> Vec<Category> {
        let publication_id = self.lock().current_publication.as_ref().map(|p| p.id);
        self.categories_for_publication(publication_id)
    }

    /// Cached categories for a publication, or all categories for `None`.
    pub fn categories_for_publication(&self, publication_id: Option<i64>) -> Vec<Category> {
        let state = self.lock();
        match publication_id {
            Some(id) => state
                .categories
                .iter()
                .filter(|category| category.publication_id == id)
                .cloned()
                .collect(),
            None => state.categories.clone(),
        }
    }

    /// Cached article count per publication id.
    pub fn article_counts_by_publication(&self) -> HashMap<i64, usize> {
        let state = self.lock();
        state
            .publications
            .iter()
            .map(|publication| {
                let count = state
                    .articles
                    .iter()
                    .filter(|article| article.publication_id == Some(publication.id))
                    .count();
                (publication.id, count)
            })
            .collect()
    }

    pub fn publications(&self) -> Vec<Publication> {
        self.lock().publications.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    pub fn authors(&self) -> Vec<Author> {
        self.lock().authors.clone()
    }

    pub fn articles(&self) -> Vec<Article> {
        self.lock().articles.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    /// Loads everything the dashboard needs on entry: user scope, articles,
    /// authors, and a default publication selection.
    ///
    /// Safe to call unconditionally; any failure is converted into the
    /// transient error slot and not propagated.
    pub async fn initialize(&self) {
        if let Err(err) = self.initialize_inner().await {
            warn!(error = %err, "content initialization failed");
            self.set_error(err.user_message());
        }
    }

    async fn initialize_inner(&self) -> Result<()> {
        let scope = self.load_user_scope().await?;
        let username = self.session.current_username()?;
        self.load_articles(&username, None).await?;

        let mut state = self.lock();
        if state.current_publication.is_none() {
            state.current_publication = scope.publications.first().cloned();
        }
        Ok(())
    }
}

/// Adds authors referenced by `article` that the cache has not seen yet.
fn merge_new_authors(cache: &mut Vec<Author>, article: &Article) {
    for author in extract_authors(std::slice::from_ref(article)) {
        if !cache.iter().any(|existing| existing.id == author.id) {
            cache.push(author);
        }
    }
}
