//! Point-of-sale screen.
//!
//! Product tiles on the left, the session cart on the right. All cart
//! changes go through `/api/cart`; `static/js/pos.js` redraws the cart from
//! each response.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use tokoku_core::PaymentMethod;

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, load_cart};
use crate::models::CurrentUser;
use crate::routes::views::{CartView, ProductRow};
use crate::services::InventoryService;
use crate::state::AppState;

/// POS page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/pos.html")]
pub struct PosTemplate {
    pub user: CurrentUser,
    pub active: &'static str,
    pub products: Vec<ProductRow>,
    pub cart: CartView,
    pub payment_methods: &'static [PaymentMethod],
}

/// Render the POS screen.
#[instrument(skip(state, user, session), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse> {
    let products = InventoryService::new(state.pool(), state.hub())
        .list_products(user.id)
        .await?;
    let cart = load_cart(&session).await?;

    Ok(PosTemplate {
        active: "transaction",
        products: products.iter().map(ProductRow::from).collect(),
        cart: CartView::from(&cart),
        payment_methods: PaymentMethod::ALL,
        user,
    })
}
