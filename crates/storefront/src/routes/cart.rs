//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation responds with the refreshed drawer fragment plus an
//! out-of-band swap for the header count badge, so one round trip keeps
//! the whole page consistent. Cart IDs live in the session and key into
//! the in-memory [`CartStore`](crate::cart::CartStore).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use m2verse_core::{CartId, ProductId};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{Cart, CartLine};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalUser, RequireUser};
use crate::models::CurrentUser;
use crate::models::session::keys;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub image: String,
    pub category: String,
    pub price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: Decimal,
    pub count: u32,
    pub open: bool,
}

impl CartView {
    /// Create an empty, closed cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: Decimal::ZERO,
            count: 0,
            open: false,
        }
    }
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.item.id.as_i32(),
            name: line.item.name.clone(),
            image: line.item.image.clone(),
            category: line.item.category.clone(),
            price: line.item.price,
            quantity: line.quantity,
            subtotal: line.subtotal(),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total: cart.total_price(),
            count: cart.total_items(),
            open: cart.is_open(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session, if one was assigned.
async fn cart_id(session: &Session) -> Option<CartId> {
    session.get::<CartId>(keys::CART_ID).await.ok().flatten()
}

/// Get the cart ID from the session, assigning a fresh one on first use.
async fn ensure_cart_id(session: &Session) -> Result<CartId, tower_sessions::session::Error> {
    if let Some(id) = session.get::<CartId>(keys::CART_ID).await? {
        return Ok(id);
    }
    let id = CartId::new();
    session.insert(keys::CART_ID, id).await?;
    Ok(id)
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
}

/// Update quantity form data. Zero or negative removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: i64,
}

/// Remove line form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart drawer fragment template (for HTMX).
///
/// Carries an out-of-band swap for the `#cart-count` badge alongside the
/// drawer itself.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_fragment.html")]
pub struct CartDrawerTemplate {
    pub cart: CartView,
    pub user: Option<CurrentUser>,
}

/// Checkout stub page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub user: Option<CurrentUser>,
    pub cart: CartView,
    pub order_url: String,
}

/// Snapshot the session's cart for page templates without creating one.
pub(crate) async fn current_cart_view(state: &AppState, session: &Session) -> CartView {
    match cart_id(session).await {
        Some(id) => CartView::from(&state.carts().snapshot(id)),
        None => CartView::empty(),
    }
}

/// Render the drawer for the session's cart.
async fn drawer(state: &AppState, session: &Session, user: Option<CurrentUser>) -> CartDrawerTemplate {
    CartDrawerTemplate {
        cart: current_cart_view(state, session).await,
        user,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart drawer fragment.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> impl IntoResponse {
    drawer(&state, &session, user).await
}

/// Add one unit of a product to the cart (HTMX).
///
/// Assigns a cart ID on first use and opens the drawer so the visitor
/// sees what just happened.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let Some(product) = state.catalog().product(ProductId::new(form.product_id)) else {
        tracing::warn!(product_id = form.product_id, "Add to cart for unknown product");
        return Ok((
            StatusCode::NOT_FOUND,
            Html("<span class=\"form-error\">Produto não encontrado</span>"),
        )
            .into_response());
    };

    let id = ensure_cart_id(&session).await?;
    let cart = state.carts().with_cart(id, |cart| {
        cart.add_item(product);
        cart.set_open(true);
    });

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartDrawerTemplate {
            cart: CartView::from(&cart),
            user,
        },
    )
        .into_response())
}

/// Set a line's quantity (HTMX). Zero or negative removes the line.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Some(id) = cart_id(&session).await else {
        return drawer(&state, &session, user).await.into_response();
    };

    let cart = state.carts().with_cart(id, |cart| {
        cart.update_quantity(ProductId::new(form.product_id), form.quantity);
    });

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartDrawerTemplate {
            cart: CartView::from(&cart),
            user,
        },
    )
        .into_response()
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Some(id) = cart_id(&session).await else {
        return drawer(&state, &session, user).await.into_response();
    };

    let cart = state.carts().with_cart(id, |cart| {
        cart.remove_item(ProductId::new(form.product_id));
    });

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartDrawerTemplate {
            cart: CartView::from(&cart),
            user,
        },
    )
        .into_response()
}

/// Empty the cart (HTMX). The drawer stays open.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Response {
    let Some(id) = cart_id(&session).await else {
        return drawer(&state, &session, user).await.into_response();
    };

    let cart = state.carts().with_cart(id, Cart::clear);

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartDrawerTemplate {
            cart: CartView::from(&cart),
            user,
        },
    )
        .into_response()
}

/// Toggle the drawer visibility flag (HTMX).
#[instrument(skip(state, session, user))]
pub async fn toggle(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> Result<Response, AppError> {
    let id = ensure_cart_id(&session).await?;
    let cart = state.carts().with_cart(id, Cart::toggle_open);

    Ok(CartDrawerTemplate {
        cart: CartView::from(&cart),
        user,
    }
    .into_response())
}

/// Checkout gate.
///
/// Anonymous visitors are redirected to the login page by the extractor;
/// signed-in users get the stub notice, since orders close over WhatsApp
/// rather than an online payment flow.
#[instrument(skip(state, session, user))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> impl IntoResponse {
    let cart = current_cart_view(&state, &session).await;

    CheckoutTemplate {
        user: Some(user),
        cart,
        order_url: state.whatsapp().order_link(),
    }
}
