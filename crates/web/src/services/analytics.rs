//! Dashboard insights written by Gemini from the user's own figures.
//!
//! The dashboard never fails because of the model: any API or parse error
//! is logged and replaced by [`Insights::fallback`].

use askama::Template;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tokoku_core::{
    InventorySummary, Product, Rupiah, SalesSummary, StockLevel, Transaction, transaction,
};

use crate::gemini::{self, GeminiClient, GeminiError};

/// Products and days included in the prompt.
const TOP_PRODUCTS: usize = 5;
const RECENT_DAYS: usize = 7;
const LOW_STOCK_LISTED: usize = 10;

#[derive(Template)]
#[template(path = "prompts/insights.txt")]
struct InsightsPrompt<'a> {
    inventory: &'a InventorySummary,
    sales: &'a SalesSummary,
    low_stock: Vec<&'a str>,
    top_products: Vec<(String, u64)>,
    daily_revenue: Vec<(NaiveDate, Rupiah)>,
}

/// One titled observation or suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightItem {
    pub title: String,
    pub detail: String,
}

/// Insights payload returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<InsightItem>,
    #[serde(default)]
    pub recommendations: Vec<InsightItem>,
    #[serde(default)]
    pub restock: Vec<String>,
    /// `false` when this is the static fallback.
    #[serde(default = "generated_default")]
    pub generated: bool,
}

const fn generated_default() -> bool {
    true
}

impl Insights {
    /// Static payload used whenever the model cannot be reached or parsed.
    #[must_use]
    pub fn fallback() -> Self {
        let item = |title: &str, detail: &str| InsightItem {
            title: title.to_owned(),
            detail: detail.to_owned(),
        };
        Self {
            summary: "Analisis AI belum tersedia saat ini. Berikut beberapa tips umum untuk usaha Anda."
                .to_owned(),
            highlights: vec![
                item(
                    "Catat setiap penjualan",
                    "Data penjualan yang lengkap membuat analisis lebih akurat.",
                ),
                item(
                    "Pantau stok menipis",
                    "Produk dengan stok 5 atau kurang ditandai merah di halaman inventaris.",
                ),
            ],
            recommendations: vec![
                item(
                    "Promosikan produk terlaris",
                    "Unggah foto produk terlaris ke media sosial memakai Studio Konten.",
                ),
                item(
                    "Tawarkan pembayaran QRIS",
                    "Pembayaran non-tunai memudahkan pelanggan dan pencatatan.",
                ),
            ],
            restock: Vec::new(),
            generated: false,
        }
    }
}

/// Render the insights prompt from the user's records.
#[must_use]
pub fn build_prompt(products: &[Product], transactions: &[Transaction]) -> String {
    let inventory = InventorySummary::from_products(products);
    let sales = SalesSummary::from_transactions(transactions);
    let daily = transaction::revenue_by_day(transactions);
    let skip = daily.len().saturating_sub(RECENT_DAYS);

    let prompt = InsightsPrompt {
        inventory: &inventory,
        sales: &sales,
        low_stock: products
            .iter()
            .filter(|p| p.stock_level() == StockLevel::Low)
            .map(|p| p.name.as_str())
            .take(LOW_STOCK_LISTED)
            .collect(),
        top_products: transaction::top_products(transactions, TOP_PRODUCTS),
        daily_revenue: daily.into_iter().skip(skip).collect(),
    };

    prompt.render().unwrap_or_default()
}

pub struct AnalyticsService<'a> {
    gemini: &'a GeminiClient,
}

impl<'a> AnalyticsService<'a> {
    #[must_use]
    pub const fn new(gemini: &'a GeminiClient) -> Self {
        Self { gemini }
    }

    /// Insights for the dashboard, or the fallback on any failure.
    #[instrument(skip_all, fields(products = products.len(), transactions = transactions.len()))]
    pub async fn dashboard_insights(
        &self,
        products: &[Product],
        transactions: &[Transaction],
    ) -> Insights {
        match self.generate(products, transactions).await {
            Ok(insights) => insights,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to static insights");
                Insights::fallback()
            }
        }
    }

    async fn generate(
        &self,
        products: &[Product],
        transactions: &[Transaction],
    ) -> Result<Insights, GeminiError> {
        let prompt = build_prompt(products, transactions);
        let request = gemini::GenerateContentRequest::new(vec![gemini::Content::text(
            tokoku_core::ChatRole::User,
            prompt,
        )])
        .json_response();
        let text = self.gemini.generate_text(&request).await?;
        parse_insights(&text)
    }
}

/// Parse the model's reply, tolerating a Markdown code fence.
///
/// # Errors
///
/// Returns `GeminiError::Parse` when the reply is not the expected JSON.
pub fn parse_insights(text: &str) -> Result<Insights, GeminiError> {
    let mut insights: Insights = gemini::parse_json(text)?;
    insights.generated = true;
    Ok(insights)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tokoku_core::{
        LineItem, PaymentMethod, ProductId, SalesChannel, TransactionId, TransactionStatus, UserId,
    };

    use super::*;

    fn product(id: i32, name: &str, stock: i32) -> Product {
        Product {
            id: ProductId::new(id),
            user_id: UserId::new(1),
            name: name.to_string(),
            category: "Makanan".to_string(),
            price: Rupiah::from_whole(15_000),
            stock,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(id: i32, name: &str, quantity: u32) -> Transaction {
        Transaction {
            id: TransactionId::new(id),
            user_id: UserId::new(1),
            timestamp: Utc
                .with_ymd_and_hms(2026, 3, 10, 9, 0, 0)
                .single()
                .expect("date"),
            total: Rupiah::from_whole(15_000) * quantity,
            items: vec![LineItem {
                product_id: None,
                name: name.to_string(),
                quantity,
                price: Rupiah::from_whole(15_000),
            }],
            status: TransactionStatus::Completed,
            payment_method: PaymentMethod::Cash,
            channel: SalesChannel::Pos,
            customer_name: None,
        }
    }

    #[test]
    fn test_prompt_contains_figures() {
        let products = vec![product(1, "Keripik Pedas", 3), product(2, "Sambal Roa", 40)];
        let sales = vec![sale(1, "Keripik Pedas", 4)];
        let prompt = build_prompt(&products, &sales);

        assert!(prompt.contains("Jumlah produk: 2"));
        assert!(prompt.contains("  - Keripik Pedas\n"));
        assert!(prompt.contains("Keripik Pedas: 4 unit"));
        assert!(prompt.contains("2026-03-10: Rp 60.000"));
    }

    #[test]
    fn test_parse_insights_with_fence() {
        let text = r#"```json
{"summary":"Penjualan stabil","highlights":[{"title":"A","detail":"B"}],"recommendations":[],"restock":["Keripik"]}
```"#;
        let insights = parse_insights(text).expect("parse");
        assert_eq!(insights.summary, "Penjualan stabil");
        assert_eq!(insights.restock, vec!["Keripik".to_string()]);
        assert!(insights.generated);
    }

    #[test]
    fn test_parse_insights_rejects_prose() {
        assert!(parse_insights("Berikut analisis saya: penjualan naik.").is_err());
    }

    #[test]
    fn test_fallback_is_marked() {
        let fallback = Insights::fallback();
        assert!(!fallback.generated);
        assert!(!fallback.recommendations.is_empty());
    }
}
