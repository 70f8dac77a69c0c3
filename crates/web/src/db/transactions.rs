//! Transaction repository for recorded sales.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tokoku_core::{LineItem, NewTransaction, Rupiah, Transaction, TransactionId, UserId};

use super::{RepositoryError, conflict_on_unique, parse_column};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, occurred_at, total, items, status, payment_method, channel, customer_name";

/// Internal row type for transaction queries.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    user_id: i32,
    occurred_at: DateTime<Utc>,
    total: Rupiah,
    items: Json<Vec<LineItem>>,
    status: String,
    payment_method: String,
    channel: String,
    customer_name: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TransactionId::new(row.id),
            user_id: UserId::new(row.user_id),
            timestamp: row.occurred_at,
            total: row.total,
            items: row.items.0,
            status: parse_column(&row.status)?,
            payment_method: parse_column(&row.payment_method)?,
            channel: parse_column(&row.channel)?,
            customer_name: row.customer_name,
        })
    }
}

/// Repository for transaction database operations.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All sales recorded by a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored enum is unknown.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM tokoku.transaction WHERE user_id = $1 ORDER BY occurred_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Record one sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        transaction: &NewTransaction,
    ) -> Result<Transaction, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut *conn, user_id, transaction, None).await
    }

    /// Record many sales atomically. Either all rows are stored or none.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create_many(
        &self,
        user_id: UserId,
        transactions: &[NewTransaction],
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            stored.push(Self::insert(&mut *tx, user_id, transaction, None).await?);
        }
        tx.commit().await?;
        Ok(stored)
    }

    /// Insert a sale on a caller-owned connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `idempotency_key` was already used
    /// by this user.
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: UserId,
        transaction: &NewTransaction,
        idempotency_key: Option<Uuid>,
    ) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            r"
            INSERT INTO tokoku.transaction
                (user_id, occurred_at, total, items, status, payment_method, channel,
                 customer_name, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TRANSACTION_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(transaction.timestamp)
        .bind(transaction.total)
        .bind(Json(&transaction.items))
        .bind(transaction.status.as_str())
        .bind(transaction.payment_method.as_str())
        .bind(transaction.channel.as_str())
        .bind(transaction.customer_name.as_deref())
        .bind(idempotency_key)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| conflict_on_unique(e, "transaction"))?;

        row.try_into()
    }

    /// Find a sale previously recorded with the given idempotency key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_idempotency_key(
        conn: &mut PgConnection,
        user_id: UserId,
        key: Uuid,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM tokoku.transaction WHERE user_id = $1 AND idempotency_key = $2"
        ))
        .bind(user_id)
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(TryInto::try_into).transpose()
    }
}
