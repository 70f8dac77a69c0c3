//! Sales records, filtering, and summaries.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{PaymentMethod, ProductId, Rupiah, SalesChannel, TransactionId, TransactionStatus, UserId};
use crate::validation::{self, ValidationError, optional_text, required_text};

const MAX_CUSTOMER_NAME_LENGTH: usize = 120;
const MAX_ITEM_NAME_LENGTH: usize = 120;

/// One product line on a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Inventory product, when the sale was rung up against one.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Product name at the time of sale.
    pub name: String,
    pub quantity: u32,
    /// Unit price at the time of sale.
    pub price: Rupiah,
}

impl LineItem {
    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Rupiah {
        self.price * self.quantity
    }

    fn validate(self) -> Result<Self, ValidationError> {
        let name = required_text("item name", &self.name, MAX_ITEM_NAME_LENGTH)?;
        let quantity = validation::quantity("quantity", self.quantity)?;
        let price = validation::amount("price", self.price)?;
        Ok(Self {
            name,
            quantity,
            price,
            ..self
        })
    }
}

/// Sum of line subtotals, checked against what a sale total can hold.
///
/// # Errors
///
/// Returns [`ValidationError::TooLarge`] for `"total"` on overflow or when
/// the sum is above [`Rupiah::MAX`].
pub fn lines_total(items: &[LineItem]) -> Result<Rupiah, ValidationError> {
    items
        .iter()
        .map(|item| item.price.checked_mul(item.quantity))
        .try_fold(Rupiah::ZERO, |acc, subtotal| acc.checked_add(subtotal?))
        .ok_or(ValidationError::TooLarge("total"))
        .and_then(|total| validation::amount("total", total))
}

/// A recorded sale. Its status never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
    pub total: Rupiah,
    pub items: Vec<LineItem>,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub channel: SalesChannel,
    pub customer_name: Option<String>,
}

impl Transaction {
    /// Short reference printed on receipts, e.g. `TRX-000042`.
    #[must_use]
    pub fn reference(&self) -> String {
        format!("TRX-{:06}", self.id.as_i32())
    }

    /// Number of units sold across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// A sale submitted by a user or an import file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionInput {
    /// When the sale happened; defaults to now.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub channel: SalesChannel,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Recorded total, accepted only on import; computed from the lines
    /// when absent.
    #[serde(default)]
    pub total: Option<Rupiah>,
}

/// A validated sale ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub timestamp: DateTime<Utc>,
    pub total: Rupiah,
    pub items: Vec<LineItem>,
    pub status: TransactionStatus,
    pub payment_method: PaymentMethod,
    pub channel: SalesChannel,
    pub customer_name: Option<String>,
}

impl TransactionInput {
    /// Validate a sale entered now. The total always comes from the lines.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when there are no lines, a line is
    /// invalid, the lines add up to more than can be stored, or a total was
    /// supplied.
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewTransaction, ValidationError> {
        if self.total.is_some() {
            return Err(ValidationError::NotAllowed("total"));
        }
        self.settle(now)
    }

    /// Validate a row of imported history, keeping its recorded total.
    ///
    /// Old receipts may carry discounts or rounding, so a supplied total is
    /// kept as long as it can be stored.
    ///
    /// # Errors
    ///
    /// As [`TransactionInput::validate`], except that a supplied total is
    /// checked instead of rejected.
    pub fn validate_import(self, now: DateTime<Utc>) -> Result<NewTransaction, ValidationError> {
        self.settle(now)
    }

    fn settle(self, now: DateTime<Utc>) -> Result<NewTransaction, ValidationError> {
        if self.items.is_empty() {
            return Err(ValidationError::Empty("items"));
        }
        let items = self
            .items
            .into_iter()
            .map(LineItem::validate)
            .collect::<Result<Vec<_>, _>>()?;

        let total = match self.total {
            Some(total) => validation::amount("total", total)?,
            None => lines_total(&items)?,
        };

        Ok(NewTransaction {
            timestamp: self.timestamp.unwrap_or(now),
            total,
            items,
            status: self.status,
            payment_method: self.payment_method,
            channel: self.channel,
            customer_name: optional_text(
                "customer name",
                self.customer_name.as_deref(),
                MAX_CUSTOMER_NAME_LENGTH,
            )?,
        })
    }
}

/// Order transactions newest first.
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.id.as_i32().cmp(&a.id.as_i32()))
    });
}

/// Status dropdown and search box on the sales screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionFilter {
    /// `None` (or `"all"` in a query string) shows every status.
    #[serde(default, deserialize_with = "status_or_all")]
    pub status: Option<TransactionStatus>,
    /// Case-insensitive substring matched against customer name or id.
    #[serde(default, rename = "q")]
    pub query: Option<String>,
}

impl TransactionFilter {
    /// Whether a transaction passes both the status and the search filter.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(status) = self.status
            && transaction.status != status
        {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let needle = query.to_lowercase();
                let customer_hit = transaction
                    .customer_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle));
                let id_hit = transaction.id.to_string().contains(&needle)
                    || transaction.reference().to_lowercase().contains(&needle);
                customer_hit || id_hit
            }
        }
    }

    /// Keep the transactions that match, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|t| self.matches(t)).collect()
    }
}

fn status_or_all<'de, D>(deserializer: D) -> Result<Option<TransactionStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("" | "all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Headline figures for the sales screen and dashboard.
///
/// Revenue counts completed sales only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalesSummary {
    pub revenue: Rupiah,
    pub transaction_count: usize,
    pub completed_count: usize,
    pub pending_count: usize,
    pub cancelled_count: usize,
    pub average_ticket: Rupiah,
    pub units_sold: u64,
}

impl SalesSummary {
    /// Summarize a transaction list.
    #[must_use]
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let completed: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed)
            .collect();
        let revenue: Rupiah = completed.iter().map(|t| t.total).sum();
        let average_ticket = if completed.is_empty() {
            Rupiah::ZERO
        } else {
            Rupiah::new((revenue.amount() / Decimal::from(completed.len())).round_dp(0))
        };

        Self {
            revenue,
            transaction_count: transactions.len(),
            completed_count: completed.len(),
            pending_count: count_status(transactions, TransactionStatus::Pending),
            cancelled_count: count_status(transactions, TransactionStatus::Cancelled),
            average_ticket,
            units_sold: completed.iter().map(|t| t.unit_count()).sum(),
        }
    }
}

fn count_status(transactions: &[Transaction], status: TransactionStatus) -> usize {
    transactions.iter().filter(|t| t.status == status).count()
}

/// Completed revenue per calendar day (UTC), oldest first.
#[must_use]
pub fn revenue_by_day(transactions: &[Transaction]) -> Vec<(NaiveDate, Rupiah)> {
    let mut days: BTreeMap<NaiveDate, Rupiah> = BTreeMap::new();
    for t in transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Completed)
    {
        let entry = days.entry(t.timestamp.date_naive()).or_default();
        *entry = *entry + t.total;
    }
    days.into_iter().collect()
}

/// Best-selling products by completed units, highest first.
#[must_use]
pub fn top_products(transactions: &[Transaction], limit: usize) -> Vec<(String, u64)> {
    let mut units: BTreeMap<String, u64> = BTreeMap::new();
    for item in transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Completed)
        .flat_map(|t| &t.items)
    {
        *units.entry(item.name.clone()).or_default() += u64::from(item.quantity);
    }
    let mut ranked: Vec<(String, u64)> = units.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn item(name: &str, quantity: u32, price: i64) -> LineItem {
        LineItem {
            product_id: None,
            name: name.to_owned(),
            quantity,
            price: Rupiah::from_whole(price),
        }
    }

    fn sale(id: i32, customer: Option<&str>, status: TransactionStatus, hour: u32) -> Transaction {
        let items = vec![item("Kopi", 2, 5_000)];
        Transaction {
            id: TransactionId::new(id),
            user_id: UserId::new(1),
            timestamp: Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).single().expect("valid"),
            total: items.iter().map(LineItem::subtotal).sum(),
            items,
            status,
            payment_method: PaymentMethod::Cash,
            channel: SalesChannel::Pos,
            customer_name: customer.map(str::to_owned),
        }
    }

    #[test]
    fn test_validate_computes_total() {
        let now = Utc::now();
        let input = TransactionInput {
            timestamp: None,
            items: vec![item("Kopi", 2, 5_000), item("Roti", 1, 8_000)],
            status: TransactionStatus::Completed,
            payment_method: PaymentMethod::Qris,
            channel: SalesChannel::Online,
            customer_name: Some("  Ani ".to_owned()),
            total: None,
        };
        let tx = input.validate(now).expect("valid");
        assert_eq!(tx.total, Rupiah::from_whole(18_000));
        assert_eq!(tx.timestamp, now);
        assert_eq!(tx.customer_name.as_deref(), Some("Ani"));
    }

    #[test]
    fn test_validate_rejects_empty_and_zero_quantity() {
        let now = Utc::now();
        let empty: TransactionInput =
            serde_json::from_value(serde_json::json!({ "items": [] })).expect("deserialize");
        assert_eq!(empty.validate(now), Err(ValidationError::Empty("items")));

        let zero: TransactionInput = serde_json::from_value(serde_json::json!({
            "items": [{ "name": "Kopi", "quantity": 0, "price": "5000" }]
        }))
        .expect("deserialize");
        assert_eq!(zero.validate(now), Err(ValidationError::ZeroQuantity("quantity")));
    }

    #[test]
    fn test_validate_rejects_prices_and_quantities_out_of_range() {
        let now = Utc::now();
        let oversized: TransactionInput = serde_json::from_value(serde_json::json!({
            "items": [{ "name": "Kopi", "quantity": 2, "price": "79228162514264337593543950335" }]
        }))
        .expect("deserialize");
        assert_eq!(oversized.validate(now), Err(ValidationError::TooLarge("price")));

        let many: TransactionInput = serde_json::from_value(serde_json::json!({
            "items": [{ "name": "Kopi", "quantity": 4_000_000_000_u32, "price": "5000" }]
        }))
        .expect("deserialize");
        assert_eq!(
            many.validate(now),
            Err(ValidationError::QuantityTooLarge {
                field: "quantity",
                max: validation::MAX_QUANTITY
            })
        );

        let sum_overflows_column: TransactionInput = serde_json::from_value(serde_json::json!({
            "items": [{ "name": "Mesin Kopi", "quantity": 100_000, "price": "999999999999" }]
        }))
        .expect("deserialize");
        assert_eq!(
            sum_overflows_column.validate(now),
            Err(ValidationError::TooLarge("total"))
        );
    }

    #[test]
    fn test_supplied_total_only_on_import() {
        let now = Utc::now();
        let row = || -> TransactionInput {
            serde_json::from_value(serde_json::json!({
                "items": [{ "name": "Kopi", "quantity": 2, "price": "12000" }],
                "total": "1"
            }))
            .expect("deserialize")
        };

        assert_eq!(row().validate(now), Err(ValidationError::NotAllowed("total")));
        let imported = row().validate_import(now).expect("valid");
        assert_eq!(imported.total, Rupiah::from_whole(1));

        let negative: TransactionInput = serde_json::from_value(serde_json::json!({
            "items": [{ "name": "Kopi", "quantity": 1, "price": "12000" }],
            "total": "-5"
        }))
        .expect("deserialize");
        assert_eq!(negative.validate_import(now), Err(ValidationError::Negative("total")));
    }

    #[test]
    fn test_unit_count_does_not_wrap() {
        let mut big = sale(1, None, TransactionStatus::Completed, 8);
        big.items = vec![item("Kopi", 4_000_000_000, 1), item("Teh", 4_000_000_000, 1)];
        assert_eq!(big.unit_count(), 8_000_000_000);
        assert_eq!(SalesSummary::from_transactions(&[big]).units_sold, 8_000_000_000);
    }

    #[test]
    fn test_filter_by_status_and_query() {
        let sales = vec![
            sale(1, Some("Budi Santoso"), TransactionStatus::Completed, 8),
            sale(2, Some("Siti"), TransactionStatus::Pending, 9),
            sale(13, None, TransactionStatus::Completed, 10),
            sale(4, Some("budiman"), TransactionStatus::Cancelled, 11),
        ];

        let budi = TransactionFilter {
            status: None,
            query: Some("BUDI".to_owned()),
        };
        let ids: Vec<i32> = budi.apply(&sales).iter().map(|t| t.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 4]);

        let completed_budi = TransactionFilter {
            status: Some(TransactionStatus::Completed),
            query: Some("budi".to_owned()),
        };
        let ids: Vec<i32> = completed_budi
            .apply(&sales)
            .iter()
            .map(|t| t.id.as_i32())
            .collect();
        assert_eq!(ids, vec![1]);

        let by_id = TransactionFilter {
            status: None,
            query: Some("13".to_owned()),
        };
        let ids: Vec<i32> = by_id.apply(&sales).iter().map(|t| t.id.as_i32()).collect();
        assert_eq!(ids, vec![13]);

        let by_reference = TransactionFilter {
            status: None,
            query: Some("trx-000002".to_owned()),
        };
        assert_eq!(by_reference.apply(&sales).len(), 1);

        assert_eq!(TransactionFilter::default().apply(&sales).len(), 4);
    }

    #[test]
    fn test_filter_deserializes_all_as_none() {
        let filter: TransactionFilter =
            serde_json::from_value(serde_json::json!({ "status": "all", "q": "ani" }))
                .expect("deserialize");
        assert_eq!(filter.status, None);
        let filter: TransactionFilter =
            serde_json::from_value(serde_json::json!({ "status": "pending" })).expect("deserialize");
        assert_eq!(filter.status, Some(TransactionStatus::Pending));
    }

    #[test]
    fn test_sort_and_summary() {
        let mut sales = vec![
            sale(1, None, TransactionStatus::Completed, 8),
            sale(2, None, TransactionStatus::Pending, 12),
            sale(3, None, TransactionStatus::Completed, 10),
        ];
        sort_newest_first(&mut sales);
        let ids: Vec<i32> = sales.iter().map(|t| t.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let summary = SalesSummary::from_transactions(&sales);
        assert_eq!(summary.revenue, Rupiah::from_whole(20_000));
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.average_ticket, Rupiah::from_whole(10_000));
        assert_eq!(summary.units_sold, 4);

        let days = revenue_by_day(&sales);
        assert_eq!(days.len(), 1);
        assert_eq!(top_products(&sales, 5), vec![("Kopi".to_owned(), 4)]);
    }
}
