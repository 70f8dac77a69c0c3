//! Point-of-sale cart API.
//!
//! The cart lives in the session. Every mutation answers with the whole
//! cart so the POS screen can redraw from one response.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tokoku_core::{ProductId, Transaction};

use crate::db::ProductRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{RequireAuth, load_cart, save_cart};
use crate::routes::views::CartView;
use crate::services::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Body of `PUT /api/cart/items/{product_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

/// `GET /api/cart`
pub async fn show(RequireAuth(_user): RequireAuth, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// `POST /api/cart/items`: add units, merging with an existing line.
#[instrument(skip(state, user, session), fields(user_id = %user.id))]
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.pool())
        .get(user.id, request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Produk tidak ditemukan".to_owned()))?;

    let mut cart = load_cart(&session).await?;
    cart.add(&product, request.quantity)?;
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// `PUT /api/cart/items/{product_id}`: set a quantity; zero removes the line.
///
/// Quantities above 100000 answer 422.
pub async fn update_item(
    RequireAuth(_user): RequireAuth,
    session: Session,
    Path(product_id): Path<i32>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if !cart.update_quantity(ProductId::new(product_id), request.quantity)? {
        return Err(AppError::NotFound("Produk tidak ada di keranjang".to_owned()));
    }
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// `DELETE /api/cart/items/{product_id}`
pub async fn remove_item(
    RequireAuth(_user): RequireAuth,
    session: Session,
    Path(product_id): Path<i32>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    if !cart.remove(ProductId::new(product_id)) {
        return Err(AppError::NotFound("Produk tidak ada di keranjang".to_owned()));
    }
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// `DELETE /api/cart`
pub async fn clear(RequireAuth(_user): RequireAuth, session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// `POST /api/cart/checkout`: record the sale, decrement stock, empty the cart.
///
/// The cart is kept when checkout fails so the cashier can fix it.
#[instrument(skip(state, user, session, request), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Transaction>)> {
    let mut cart = load_cart(&session).await?;

    let transaction = CheckoutService::new(state.pool(), state.hub())
        .checkout(user.id, &cart, request)
        .await?;

    cart.clear();
    save_cart(&session, &cart).await?;

    let reference = transaction.reference();
    add_breadcrumb("pos", "Checkout", Some(&[("transaction", reference.as_str())]));

    Ok((StatusCode::CREATED, Json(transaction)))
}
