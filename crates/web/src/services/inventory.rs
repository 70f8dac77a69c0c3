//! Inventory operations.
//!
//! Thin layer over [`ProductRepository`] that validates input, orders
//! results, and publishes a change after every write.

use futures::Stream;
use sqlx::PgPool;
use tracing::instrument;

use tokoku_core::{Product, ProductId, ProductInput, UserId, ValidationError, product};

use crate::db::{ProductRepository, RepositoryError};

use super::realtime::{ChangeHub, Collection, watch};

/// Errors from inventory writes.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct InventoryService<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// All of the user's products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_products(&self, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        list_sorted(self.pool, user_id).await
    }

    /// Validate and insert a product.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::Validation` for bad input.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn add_product(
        &self,
        user_id: UserId,
        input: ProductInput,
    ) -> Result<Product, InventoryError> {
        let input = input.validate()?;
        let product = ProductRepository::new(self.pool)
            .create(user_id, &input)
            .await?;
        self.hub.publish(user_id, Collection::Inventory);
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such product.
    #[instrument(skip(self, input), fields(user_id = %user_id, product_id = %id))]
    pub async fn update_product(
        &self,
        user_id: UserId,
        id: ProductId,
        input: ProductInput,
    ) -> Result<Product, InventoryError> {
        let input = input.validate()?;
        let product = ProductRepository::new(self.pool)
            .update(user_id, id, &input)
            .await?;
        self.hub.publish(user_id, Collection::Inventory);
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no such product.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %id))]
    pub async fn delete_product(
        &self,
        user_id: UserId,
        id: ProductId,
    ) -> Result<(), RepositoryError> {
        if !ProductRepository::new(self.pool).delete(user_id, id).await? {
            return Err(RepositoryError::NotFound);
        }
        self.hub.publish(user_id, Collection::Inventory);
        Ok(())
    }

    /// Snapshot stream of the user's products.
    pub fn subscribe_products(
        &self,
        user_id: UserId,
    ) -> impl Stream<Item = Result<Vec<Product>, RepositoryError>> + use<> {
        let pool = self.pool.clone();
        watch(self.hub, user_id, Collection::Inventory, move || {
            let pool = pool.clone();
            async move { list_sorted(&pool, user_id).await }
        })
    }
}

async fn list_sorted(pool: &PgPool, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
    let mut products = ProductRepository::new(pool).list(user_id).await?;
    product::sort_newest_first(&mut products);
    Ok(products)
}
