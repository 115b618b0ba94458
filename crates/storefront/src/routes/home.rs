//! Home page route handler.
//!
//! The home page carries the whole storefront: hero, category-filtered
//! catalog grid, testimonials, a blog teaser and the WhatsApp contact
//! section. Category filtering is a plain query parameter so the page
//! stays linkable.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{ALL_CATEGORY, Product, Testimonial};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::CurrentUser;
use crate::routes::blog::ArticleCardView;
use crate::routes::cart::{self, CartView};
use crate::services::whatsapp::WhatsAppLinks;
use crate::state::AppState;

/// Number of articles in the blog teaser section.
const BLOG_TEASER_COUNT: usize = 3;

// =============================================================================
// Product and Category Views
// =============================================================================

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub rating: f32,
    pub stars: Vec<bool>,
    pub reviews: u32,
    pub in_stock: bool,
    pub badge: Option<String>,
    pub badge_class: &'static str,
    pub whatsapp_url: String,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, links: &WhatsAppLinks) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category.clone(),
            description: product.description.clone(),
            image: product.image.clone(),
            price: product.price,
            original_price: product.original_price,
            rating: product.rating,
            stars: stars_for(product.rating),
            reviews: product.reviews,
            in_stock: product.in_stock,
            badge: product.badge.clone(),
            badge_class: badge_class(product.badge.as_deref()),
            whatsapp_url: links.product_link(&product.name),
        }
    }
}

/// Five-slot star row; filled slots match the whole part of the rating.
fn stars_for(rating: f32) -> Vec<bool> {
    let filled = rating.floor();
    (1..=5u8).map(|slot| f32::from(slot) <= filled).collect()
}

/// CSS class for a promotional badge label.
fn badge_class(badge: Option<&str>) -> &'static str {
    match badge {
        Some("Novo") => "badge-new",
        Some("Limitado") => "badge-limited",
        _ => "badge-accent",
    }
}

/// Category pill display data.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub count: usize,
    pub href: String,
    pub active: bool,
}

/// Testimonial display data.
#[derive(Clone)]
pub struct TestimonialView {
    pub name: String,
    pub avatar: String,
    pub text: String,
    pub stars: Vec<bool>,
}

impl From<&Testimonial> for TestimonialView {
    fn from(testimonial: &Testimonial) -> Self {
        Self {
            name: testimonial.name.clone(),
            avatar: testimonial.avatar.clone(),
            text: testimonial.text.clone(),
            stars: (1..=5u8).map(|slot| slot <= testimonial.rating).collect(),
        }
    }
}

// =============================================================================
// Template
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub cart: CartView,
    /// Category currently selected in the catalog grid.
    pub active_category: String,
    pub categories: Vec<CategoryView>,
    pub products: Vec<ProductCardView>,
    pub testimonials: Vec<TestimonialView>,
    /// Latest articles for the teaser; empty when the blog fails to load.
    pub articles: Vec<ArticleCardView>,
    pub order_url: String,
    pub catalog_url: String,
}

/// Category filter query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

/// Display the home page.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let active_category = query
        .category
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| ALL_CATEGORY.to_string());

    let products = state
        .catalog()
        .products_in_category(&active_category)
        .into_iter()
        .map(|p| ProductCardView::new(p, state.whatsapp()))
        .collect();

    let categories = state
        .catalog()
        .categories()
        .into_iter()
        .map(|summary| CategoryView {
            href: category_href(&summary.name),
            active: summary.name == active_category,
            name: summary.name,
            count: summary.count,
        })
        .collect();

    let testimonials = state
        .catalog()
        .testimonials()
        .iter()
        .map(TestimonialView::from)
        .collect();

    // The teaser is decoration; a blog outage must not take the home page down.
    let articles = state.blog().list().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch blog teaser: {e}");
            Vec::new()
        },
        |articles| {
            articles
                .iter()
                .take(BLOG_TEASER_COUNT)
                .map(ArticleCardView::from)
                .collect()
        },
    );

    let cart = cart::current_cart_view(&state, &session).await;

    HomeTemplate {
        user,
        cart,
        active_category,
        categories,
        products,
        testimonials,
        articles,
        order_url: state.whatsapp().order_link(),
        catalog_url: state.whatsapp().catalog_link(),
    }
}

/// Link for a category pill, keeping the visitor anchored at the grid.
fn category_href(name: &str) -> String {
    if name == ALL_CATEGORY {
        "/#products".to_string()
    } else {
        format!("/?category={}#products", urlencoding::encode(name))
    }
}
