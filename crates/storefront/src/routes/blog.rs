//! Blog route handlers.
//!
//! Articles come from the platform's `blog` collection through the
//! cached [`BlogService`](crate::services::blog::BlogService). Search
//! and category filtering happen here, server-side, so the list page
//! stays linkable.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use m2verse_core::ArticleId;

use crate::catalog::ALL_CATEGORY;
use crate::filters;
use crate::services::blog::{Article, ContentError};
use crate::state::AppState;

/// Article card data for list grids and the home page teaser.
#[derive(Clone)]
pub struct ArticleCardView {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub date: String,
    pub category: String,
    pub read_time: u32,
}

impl From<&Article> for ArticleCardView {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.to_string(),
            title: article.title.clone(),
            excerpt: article.excerpt.clone(),
            image: article.image.clone(),
            date: article.date.clone(),
            category: article.category.clone(),
            read_time: article.read_time,
        }
    }
}

/// Full article data for the show page.
#[derive(Clone)]
pub struct ArticleView {
    pub title: String,
    /// Trusted HTML from the shop's editor.
    pub content: String,
    pub image: String,
    pub date: String,
    pub category: String,
    pub author: String,
    pub read_time: u32,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone(),
            image: article.image.clone(),
            date: article.date.clone(),
            category: article.category.clone(),
            author: article.author.clone(),
            read_time: article.read_time,
        }
    }
}

/// Category filter link data.
#[derive(Clone)]
pub struct BlogCategoryView {
    pub name: String,
    pub href: String,
    pub active: bool,
}

/// Blog index query parameters.
#[derive(Debug, Deserialize)]
pub struct BlogQuery {
    /// Free-text search over title and excerpt.
    pub q: Option<String>,
    pub category: Option<String>,
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub articles: Vec<ArticleCardView>,
    pub categories: Vec<BlogCategoryView>,
    pub active_category: String,
    pub search: String,
    pub error: Option<&'static str>,
}

/// Blog article page template.
///
/// Renders the error block instead of the article when loading failed.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub article: Option<ArticleView>,
    pub error: Option<&'static str>,
}

/// Display the blog index with search and category filters applied.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
) -> impl IntoResponse {
    let search = query.q.unwrap_or_default();
    let active_category = query
        .category
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ALL_CATEGORY.to_string());

    match state.blog().list().await {
        Ok(all) => {
            let categories = category_links(&all, &active_category, &search);
            let needle = search.to_lowercase();
            let articles = all
                .iter()
                .filter(|a| active_category == ALL_CATEGORY || a.category == active_category)
                .filter(|a| {
                    needle.is_empty()
                        || a.title.to_lowercase().contains(&needle)
                        || a.excerpt.to_lowercase().contains(&needle)
                })
                .map(ArticleCardView::from)
                .collect();

            BlogIndexTemplate {
                articles,
                categories,
                active_category,
                search,
                error: None,
            }
        }
        Err(err) => {
            tracing::error!("Failed to load blog index: {err}");
            BlogIndexTemplate {
                articles: Vec::new(),
                categories: Vec::new(),
                active_category,
                search,
                error: Some("Erro ao carregar artigos"),
            }
        }
    }
}

/// Display a single article by document id.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.blog().article(&ArticleId::from(id)).await {
        Ok(article) => BlogShowTemplate {
            article: Some(ArticleView::from(article.as_ref())),
            error: None,
        }
        .into_response(),
        Err(err) => {
            let status = match &err {
                ContentError::ArticleNotFound => StatusCode::NOT_FOUND,
                ContentError::LoadFailure(_) => {
                    tracing::error!("Failed to load article: {err}");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (
                status,
                BlogShowTemplate {
                    article: None,
                    error: Some(err.user_message()),
                },
            )
                .into_response()
        }
    }
}

/// Category pills: [`ALL_CATEGORY`] first, then categories in list order.
///
/// Links keep the current search so switching filters does not drop it.
fn category_links(articles: &[Article], active: &str, search: &str) -> Vec<BlogCategoryView> {
    let mut names = vec![ALL_CATEGORY.to_string()];
    for article in articles {
        if !names.contains(&article.category) {
            names.push(article.category.clone());
        }
    }

    names
        .into_iter()
        .map(|name| BlogCategoryView {
            href: category_href(&name, search),
            active: name == active,
            name,
        })
        .collect()
}

fn category_href(name: &str, search: &str) -> String {
    let mut params = Vec::new();
    if !search.is_empty() {
        params.push(format!("q={}", urlencoding::encode(search)));
    }
    if name != ALL_CATEGORY {
        params.push(format!("category={}", urlencoding::encode(name)));
    }

    if params.is_empty() {
        "/blog".to_string()
    } else {
        format!("/blog?{}", params.join("&"))
    }
}

/// Create the blog routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, title: &str, category: &str) -> Article {
        Article {
            id: ArticleId::from(id),
            title: title.to_owned(),
            content: String::new(),
            excerpt: format!("Resumo de {title}"),
            image: "/static/img/blog.jpg".to_owned(),
            date: "12 Jan 2025".to_owned(),
            category: category.to_owned(),
            author: "Equipe M²".to_owned(),
            read_time: 4,
            created_at: None,
        }
    }

    #[test]
    fn test_category_links_dedupe_in_order() {
        let articles = vec![
            article("a1", "Primeiro", "Lançamentos"),
            article("a2", "Segundo", "Dicas"),
            article("a3", "Terceiro", "Lançamentos"),
        ];

        let links = category_links(&articles, "Dicas", "");
        let names: Vec<&str> = links.iter().map(|l| l.name.as_str()).collect();

        assert_eq!(names, vec!["Todas", "Lançamentos", "Dicas"]);
        assert!(links.iter().find(|l| l.name == "Dicas").is_some_and(|l| l.active));
    }

    #[test]
    fn test_category_href_keeps_search() {
        assert_eq!(category_href("Todas", ""), "/blog");
        assert_eq!(category_href("Dicas", ""), "/blog?category=Dicas");
        assert_eq!(
            category_href("Dicas", "colecionáveis"),
            "/blog?q=colecion%C3%A1veis&category=Dicas"
        );
    }
}
