//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog, testimonials, blog teaser)
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products/{id}/quick-view - Quick view fragment (HTMX)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart drawer fragment
//! POST /cart/add               - Add one unit of a product
//! POST /cart/update            - Set a line quantity (0 removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! POST /cart/toggle            - Toggle the drawer flag
//!
//! # Checkout
//! GET  /checkout               - Checkout gate (redirects anonymous users to /login)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! POST /login/google           - Google sign-in callback
//! GET  /register               - Register page
//! POST /register               - Register action
//! POST /logout                 - Logout action
//!
//! # Blog
//! GET  /blog                   - Article list (search + category filter)
//! GET  /blog/{id}              - Article page
//! ```

pub mod auth;
pub mod blog;
pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Mounted at the root so the paths match the original storefront
/// (`/login`, `/register`, `/logout`). The whole group sits behind the
/// per-IP rate limiter to slow down credential stuffing.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/login/google", post(auth::google))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{id}/quick-view", get(products::quick_view))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/toggle", post(cart::toggle))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product fragments
        .nest("/products", product_routes())
        // Cart fragments
        .nest("/cart", cart_routes())
        // Checkout gate
        .route("/checkout", get(cart::checkout))
        // Blog
        .nest("/blog", blog::router())
        // Auth routes
        .merge(auth_routes())
}
