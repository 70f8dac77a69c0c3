//! Point-of-sale checkout.
//!
//! Stock decrements and the sale insert share one database transaction:
//! either every line is decremented and the sale recorded, or nothing is.

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use tokoku_core::{
    Cart, NewTransaction, PaymentMethod, SalesChannel, Transaction, TransactionStatus, UserId,
    transaction::lines_total, validation::optional_text,
};

use crate::db::{ProductRepository, RepositoryError, TransactionRepository};

use super::realtime::{ChangeHub, Collection};

const MAX_CUSTOMER_NAME_LENGTH: usize = 120;

/// Errors from checkout.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    /// A line asks for more units than are in stock (or the product is gone).
    #[error("insufficient stock for {product}")]
    InsufficientStock { product: String },

    /// Customer name too long, or the cart adds up to more than a sale can hold.
    #[error("invalid sale: {0}")]
    Invalid(#[from] tokoku_core::ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Payment details submitted with the cart.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Client-generated key; resubmitting it returns the first result.
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// Record the cart as a completed POS sale and decrement stock.
    ///
    /// The caller clears the session cart on success.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart and
    /// `CheckoutError::InsufficientStock` when any line cannot be filled; in
    /// both cases nothing is written.
    #[instrument(skip(self, cart, request), fields(user_id = %user_id, lines = cart.lines().len()))]
    pub async fn checkout(
        &self,
        user_id: UserId,
        cart: &Cart,
        request: CheckoutRequest,
    ) -> Result<Transaction, CheckoutError> {
        let new = build_sale(cart, &request)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        if let Some(key) = request.idempotency_key
            && let Some(existing) =
                TransactionRepository::find_by_idempotency_key(&mut *tx, user_id, key).await?
        {
            tracing::info!(transaction_id = %existing.id, "Checkout replayed");
            return Ok(existing);
        }

        for line in cart.lines() {
            let decremented =
                ProductRepository::decrement_stock(&mut *tx, user_id, line.product_id, line.quantity)
                    .await?;
            if !decremented {
                return Err(CheckoutError::InsufficientStock {
                    product: line.name.clone(),
                });
            }
        }

        let inserted =
            TransactionRepository::insert(&mut *tx, user_id, &new, request.idempotency_key).await;

        let transaction = match inserted {
            Ok(transaction) => transaction,
            // A concurrent submit with the same key won the race.
            Err(RepositoryError::Conflict(_)) => {
                drop(tx);
                return self.replayed(user_id, request.idempotency_key).await;
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            transaction_id = %transaction.id,
            total = %transaction.total,
            "Checkout completed"
        );
        self.hub.publish(user_id, Collection::Inventory);
        self.hub.publish(user_id, Collection::Sales);
        Ok(transaction)
    }

    async fn replayed(
        &self,
        user_id: UserId,
        key: Option<Uuid>,
    ) -> Result<Transaction, CheckoutError> {
        let key = key.ok_or_else(|| {
            RepositoryError::Conflict("transaction already exists".to_owned())
        })?;
        let mut conn = self.pool.acquire().await.map_err(RepositoryError::from)?;
        TransactionRepository::find_by_idempotency_key(&mut *conn, user_id, key)
            .await?
            .ok_or_else(|| RepositoryError::NotFound.into())
    }
}

/// The sale a cart turns into.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` or `CheckoutError::Invalid`.
pub fn build_sale(cart: &Cart, request: &CheckoutRequest) -> Result<NewTransaction, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let items = cart.to_line_items();
    Ok(NewTransaction {
        timestamp: Utc::now(),
        total: lines_total(&items)?,
        items,
        status: TransactionStatus::Completed,
        payment_method: request.payment_method,
        channel: SalesChannel::Pos,
        customer_name: optional_text(
            "customer name",
            request.customer_name.as_deref(),
            MAX_CUSTOMER_NAME_LENGTH,
        )?,
    })
}
