//! Blog content service.
//!
//! Lists and fetches articles from the platform's `blog` collection,
//! caching responses for a few minutes to keep page renders off the
//! network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use m2verse_core::ArticleId;

use crate::firebase::FirebaseError;

/// How long cached blog responses stay fresh.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Upper bound on cached entries.
const CACHE_CAPACITY: u64 = 128;

/// Blog article from the `blog` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Document id.
    pub id: ArticleId,
    /// Headline.
    pub title: String,
    /// Body as trusted HTML from the shop's editor.
    pub content: String,
    /// Short teaser shown on cards.
    pub excerpt: String,
    /// Cover image URL.
    pub image: String,
    /// Display date, already formatted by the editor.
    pub date: String,
    /// Category label.
    pub category: String,
    /// Author display name.
    pub author: String,
    /// Reading time in minutes.
    pub read_time: u32,
    /// Creation timestamp used for ordering.
    pub created_at: Option<DateTime<Utc>>,
}

/// Errors surfaced by blog content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// No article exists under the requested id.
    #[error("article not found")]
    ArticleNotFound,

    /// The platform request failed or returned something undecodable.
    #[error("blog content failed to load: {0}")]
    LoadFailure(#[from] FirebaseError),
}

impl ContentError {
    /// User-facing message for the article page.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::ArticleNotFound => "Artigo não encontrado",
            Self::LoadFailure(_) => "Erro ao carregar o artigo",
        }
    }
}

/// Article source the service depends on.
///
/// Implemented by the Firestore REST client; tests substitute in-memory
/// fakes.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// All articles, newest first.
    ///
    /// # Errors
    ///
    /// Returns the platform error on transport or decode failure.
    async fn list_articles(&self) -> Result<Vec<Article>, FirebaseError>;

    /// One article by id, if it exists.
    ///
    /// # Errors
    ///
    /// Returns the platform error on transport or decode failure.
    async fn get_article(&self, id: &ArticleId) -> Result<Option<Article>, FirebaseError>;
}

/// Cached value types.
#[derive(Clone)]
enum CacheValue {
    List(Arc<Vec<Article>>),
    Article(Arc<Article>),
}

/// Blog service over the article store.
///
/// Cheap to clone; all clones share the store and the cache.
#[derive(Clone)]
pub struct BlogService {
    inner: Arc<BlogServiceInner>,
}

struct BlogServiceInner {
    store: Arc<dyn ArticleStore>,
    cache: Cache<String, CacheValue>,
}

impl BlogService {
    /// Create a service over the given article store.
    #[must_use]
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(BlogServiceInner { store, cache }),
        }
    }

    /// All articles, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::LoadFailure` when the platform request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Arc<Vec<Article>>, ContentError> {
        let cache_key = "blog:list".to_owned();

        if let Some(CacheValue::List(articles)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for article list");
            return Ok(articles);
        }

        let articles = Arc::new(self.inner.store.list_articles().await?);
        self.inner
            .cache
            .insert(cache_key, CacheValue::List(articles.clone()))
            .await;

        Ok(articles)
    }

    /// One article by id.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::ArticleNotFound` for an unknown id and
    /// `ContentError::LoadFailure` when the platform request fails.
    #[instrument(skip(self), fields(article = %id))]
    pub async fn article(&self, id: &ArticleId) -> Result<Arc<Article>, ContentError> {
        let cache_key = format!("blog:article:{id}");

        if let Some(CacheValue::Article(article)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for article");
            return Ok(article);
        }

        let article = self
            .inner
            .store
            .get_article(id)
            .await?
            .ok_or(ContentError::ArticleNotFound)?;
        let article = Arc::new(article);
        self.inner
            .cache
            .insert(cache_key, CacheValue::Article(article.clone()))
            .await;

        Ok(article)
    }
}
