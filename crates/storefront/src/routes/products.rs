//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use m2verse_core::ProductId;

use crate::error::AppError;
use crate::filters;
use crate::routes::home::ProductCardView;
use crate::state::AppState;

/// Quick view fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/quick_view.html")]
pub struct QuickViewTemplate {
    pub product: ProductCardView,
}

/// Display the quick view fragment for one product (HTMX).
///
/// # Errors
///
/// Returns 404 when no product has the given id.
#[instrument(skip(state))]
pub async fn quick_view(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<QuickViewTemplate, AppError> {
    let product = state
        .catalog()
        .product(ProductId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("produto {id}")))?;

    Ok(QuickViewTemplate {
        product: ProductCardView::new(product, state.whatsapp()),
    })
}
