//! Product repository for inventory records.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use tokoku_core::{Product, ProductId, ProductInput, Rupiah, UserId};

use super::RepositoryError;

const PRODUCT_COLUMNS: &str =
    "id, user_id, name, category, price, stock, image_url, created_at, updated_at";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    user_id: i32,
    name: String,
    category: String,
    price: Rupiah,
    stock: i32,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            category: row.category,
            price: row.price,
            stock: row.stock,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products owned by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM tokoku.product WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM tokoku.product WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a validated product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO tokoku.product (user_id, name, category, price, stock, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.image_url.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist or
    /// belongs to another user.
    pub async fn update(
        &self,
        user_id: UserId,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            UPDATE tokoku.product
            SET name = $3, category = $4, price = $5, stock = $6, image_url = $7
            WHERE id = $1 AND user_id = $2
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.image_url.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, user_id: UserId, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tokoku.product WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Take `quantity` units out of stock inside a caller-owned transaction.
    ///
    /// Returns `false`, leaving the row untouched, when the product is
    /// missing or has fewer than `quantity` units.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn decrement_stock(
        conn: &mut PgConnection,
        user_id: UserId,
        id: ProductId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        // More units than a stock column can hold can never be filled.
        let Ok(quantity) = i32::try_from(quantity) else {
            return Ok(false);
        };

        let result = sqlx::query(
            r"
            UPDATE tokoku.product
            SET stock = stock - $3
            WHERE id = $1 AND user_id = $2 AND stock >= $3
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
