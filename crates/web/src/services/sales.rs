//! Sales history: recording, listing, importing, and summaries.

use chrono::Utc;
use futures::Stream;
use sqlx::PgPool;
use tracing::instrument;

use tokoku_core::{
    SalesChannel, Transaction, TransactionInput, UserId, ValidationError, transaction,
};

use crate::db::{RepositoryError, TransactionRepository};

use super::realtime::{ChangeHub, Collection, watch};

/// Rows accepted by one import request.
pub const MAX_IMPORT_ROWS: usize = 1_000;

/// Errors from recording or importing sales.
#[derive(Debug, thiserror::Error)]
pub enum SalesError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An import row failed validation; `row` is 1-based.
    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: ValidationError,
    },

    #[error("import is limited to {MAX_IMPORT_ROWS} rows")]
    TooManyRows,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct SalesService<'a> {
    pool: &'a PgPool,
    hub: &'a ChangeHub,
}

impl<'a> SalesService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, hub: &'a ChangeHub) -> Self {
        Self { pool, hub }
    }

    /// All of the user's sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        list_sorted(self.pool, user_id).await
    }

    /// Record a single sale. The total is computed from the lines.
    ///
    /// # Errors
    ///
    /// Returns `SalesError::Validation` for bad input, including a supplied
    /// total.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn record_transaction(
        &self,
        user_id: UserId,
        input: TransactionInput,
    ) -> Result<Transaction, SalesError> {
        let new = input.validate(Utc::now())?;
        let transaction = TransactionRepository::new(self.pool)
            .create(user_id, &new)
            .await?;
        self.hub.publish(user_id, Collection::Sales);
        Ok(transaction)
    }

    /// Import sales history in one database transaction.
    ///
    /// Every row is stored with channel `import`. Nothing is stored if any
    /// row is invalid.
    ///
    /// # Errors
    ///
    /// Returns `SalesError::InvalidRow` naming the first bad row.
    #[instrument(skip(self, rows), fields(user_id = %user_id, rows = rows.len()))]
    pub async fn import_transactions(
        &self,
        user_id: UserId,
        rows: Vec<TransactionInput>,
    ) -> Result<Vec<Transaction>, SalesError> {
        let batch = prepare_import(rows)?;
        let stored = TransactionRepository::new(self.pool)
            .create_many(user_id, &batch)
            .await?;
        tracing::info!(imported = stored.len(), "Imported sales history");
        self.hub.publish(user_id, Collection::Sales);
        Ok(stored)
    }

    /// Snapshot stream of the user's sales.
    pub fn subscribe_transactions(
        &self,
        user_id: UserId,
    ) -> impl Stream<Item = Result<Vec<Transaction>, RepositoryError>> + use<> {
        let pool = self.pool.clone();
        watch(self.hub, user_id, Collection::Sales, move || {
            let pool = pool.clone();
            async move { list_sorted(&pool, user_id).await }
        })
    }
}

/// Validate import rows and force the `import` channel.
///
/// # Errors
///
/// Returns `SalesError::TooManyRows`, `SalesError::Validation` for an empty
/// batch, or `SalesError::InvalidRow` for the first invalid row.
pub fn prepare_import(
    rows: Vec<TransactionInput>,
) -> Result<Vec<tokoku_core::NewTransaction>, SalesError> {
    if rows.is_empty() {
        return Err(ValidationError::Empty("rows").into());
    }
    if rows.len() > MAX_IMPORT_ROWS {
        return Err(SalesError::TooManyRows);
    }
    let now = Utc::now();
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.validate_import(now)
                .map(|mut new| {
                    new.channel = SalesChannel::Import;
                    new
                })
                .map_err(|source| SalesError::InvalidRow { row: i + 1, source })
        })
        .collect()
}

async fn list_sorted(pool: &PgPool, user_id: UserId) -> Result<Vec<Transaction>, RepositoryError> {
    let mut transactions = TransactionRepository::new(pool).list(user_id).await?;
    transaction::sort_newest_first(&mut transactions);
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use tokoku_core::{LineItem, Rupiah};

    use super::*;

    fn row(name: &str, quantity: u32) -> TransactionInput {
        serde_json::from_value(serde_json::json!({
            "items": [{ "name": name, "quantity": quantity, "price": "12000" }],
            "channel": "online",
        }))
        .expect("row")
    }

    #[test]
    fn test_prepare_import_forces_channel() {
        let batch = prepare_import(vec![row("Kopi Susu", 2), row("Roti Bakar", 1)]).expect("ok");
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|t| t.channel == SalesChannel::Import));
        assert_eq!(batch.first().map(|t| t.total), Some(Rupiah::from_whole(24_000)));
    }

    #[test]
    fn test_prepare_import_reports_row_number() {
        let err = prepare_import(vec![row("Kopi", 1), row("Teh", 0)]).expect_err("invalid");
        assert!(matches!(err, SalesError::InvalidRow { row: 2, .. }));
        assert_eq!(err.to_string(), "row 2: quantity must be at least 1");
    }

    #[test]
    fn test_prepare_import_rejects_empty_batch() {
        assert!(matches!(
            prepare_import(Vec::new()),
            Err(SalesError::Validation(ValidationError::Empty("rows")))
        ));
    }

    #[test]
    fn test_prepare_import_keeps_recorded_total() {
        let row: TransactionInput = serde_json::from_value(serde_json::json!({
            "items": [{ "name": "Kopi", "quantity": 2, "price": "12000" }],
            "total": "22000",
        }))
        .expect("row");
        let batch = prepare_import(vec![row]).expect("ok");
        assert_eq!(batch.first().map(|t| t.total), Some(Rupiah::from_whole(22_000)));
    }

    #[test]
    fn test_prepare_import_rejects_oversized_quantity() {
        let err = prepare_import(vec![row("Kopi", 100_001)]).expect_err("invalid");
        assert_eq!(err.to_string(), "row 1: quantity must be at most 100000");
    }

    #[test]
    fn test_line_item_product_id_is_optional() {
        let item: LineItem =
            serde_json::from_str(r#"{"name":"Es Teh","quantity":3,"price":"4000"}"#).expect("item");
        assert_eq!(item.product_id, None);
    }
}
