//! Inventory records and the pure logic around them.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, Rupiah, StockLevel, UserId};
use crate::validation::{self, ValidationError, optional_text, required_text};

const MAX_NAME_LENGTH: usize = 120;
const MAX_CATEGORY_LENGTH: usize = 60;
const MAX_IMAGE_URL_LENGTH: usize = 2048;

/// A product in a user's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub user_id: UserId,
    pub name: String,
    pub category: String,
    pub price: Rupiah,
    pub stock: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Stock bucket for the badge next to this product.
    #[must_use]
    pub const fn stock_level(&self) -> StockLevel {
        StockLevel::from_stock(self.stock)
    }
}

/// Fields a user submits when creating or replacing a product.
///
/// Edits replace the whole record; there is no partial update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: Rupiah,
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductInput {
    /// Trim text fields and reject blank names, prices that cannot be stored,
    /// and negative stock.
    ///
    /// A blank category becomes `"Lainnya"` ("other").
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let name = required_text("name", &self.name, MAX_NAME_LENGTH)?;
        let category = optional_text("category", Some(&self.category), MAX_CATEGORY_LENGTH)?
            .unwrap_or_else(|| "Lainnya".to_owned());
        let price = validation::amount("price", self.price)?;
        if self.stock < 0 {
            return Err(ValidationError::Negative("stock"));
        }
        let image_url = optional_text("image_url", self.image_url.as_deref(), MAX_IMAGE_URL_LENGTH)?;

        Ok(Self {
            name,
            category,
            price,
            stock: self.stock,
            image_url,
        })
    }
}

/// Order products newest-created first.
pub fn sort_newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then(b.id.as_i32().cmp(&a.id.as_i32()))
    });
}

/// Search box and category dropdown on the inventory table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name and category.
    #[serde(default, rename = "q")]
    pub query: Option<String>,
    /// Exact category match; empty or `"all"` means every category.
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductFilter {
    /// Whether a product passes both the search and the category filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref().map(str::trim) {
            None | Some("" | "all") => true,
            Some(category) => product.category.eq_ignore_ascii_case(category),
        };

        let query_ok = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let needle = query.to_lowercase();
                product.name.to_lowercase().contains(&needle)
                    || product.category.to_lowercase().contains(&needle)
            }
        };

        category_ok && query_ok
    }

    /// Keep the products that match, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct categories, sorted, for the filter dropdown.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Totals shown above the inventory table and on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub product_count: usize,
    pub total_units: i64,
    pub low_stock_count: usize,
    pub stock_value: Rupiah,
}

impl InventorySummary {
    /// Summarize a product list.
    #[must_use]
    pub fn from_products(products: &[Product]) -> Self {
        Self {
            product_count: products.len(),
            total_units: products.iter().map(|p| i64::from(p.stock.max(0))).sum(),
            low_stock_count: products
                .iter()
                .filter(|p| p.stock_level() == StockLevel::Low)
                .count(),
            stock_value: products
                .iter()
                .map(|p| p.price * u32::try_from(p.stock).unwrap_or(0))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn product(id: i32, name: &str, category: &str, stock: i32, day: u32) -> Product {
        let at = Utc.with_ymd_and_hms(2026, 3, day, 8, 0, 0).single().expect("valid date");
        Product {
            id: ProductId::new(id),
            user_id: UserId::new(1),
            name: name.to_owned(),
            category: category.to_owned(),
            price: Rupiah::from_whole(10_000),
            stock,
            image_url: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_validate_trims_and_defaults_category() {
        let input = ProductInput {
            name: "  Keripik Singkong ".to_owned(),
            category: " ".to_owned(),
            price: Rupiah::from_whole(12_000),
            stock: 4,
            image_url: Some(String::new()),
        };
        let valid = input.validate().expect("valid");
        assert_eq!(valid.name, "Keripik Singkong");
        assert_eq!(valid.category, "Lainnya");
        assert_eq!(valid.image_url, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = ProductInput {
            name: "Teh".to_owned(),
            category: "Minuman".to_owned(),
            price: Rupiah::from_whole(3_000),
            stock: 1,
            image_url: None,
        };
        let blank = ProductInput {
            name: String::new(),
            ..base.clone()
        };
        assert_eq!(blank.validate(), Err(ValidationError::Required("name")));

        let negative_price = ProductInput {
            price: Rupiah::from_whole(-1),
            ..base.clone()
        };
        assert_eq!(negative_price.validate(), Err(ValidationError::Negative("price")));

        let oversized_price = ProductInput {
            price: Rupiah::new("79228162514264337593543950335".parse().expect("decimal")),
            ..base.clone()
        };
        assert_eq!(oversized_price.validate(), Err(ValidationError::TooLarge("price")));

        let fractional_sen = ProductInput {
            price: Rupiah::new("1500.505".parse().expect("decimal")),
            ..base.clone()
        };
        assert_eq!(fractional_sen.validate(), Err(ValidationError::TooPrecise("price")));

        let negative_stock = ProductInput { stock: -1, ..base };
        assert_eq!(negative_stock.validate(), Err(ValidationError::Negative("stock")));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut products = vec![
            product(1, "A", "X", 1, 1),
            product(2, "B", "X", 1, 3),
            product(3, "C", "X", 1, 2),
        ];
        sort_newest_first(&mut products);
        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_filter_by_query_and_category() {
        let products = vec![
            product(1, "Kopi Susu", "Minuman", 10, 1),
            product(2, "Keripik Pedas", "Makanan", 3, 2),
            product(3, "Es Kopi", "Minuman", 30, 3),
        ];

        let kopi = ProductFilter {
            query: Some("KOPI".to_owned()),
            category: None,
        };
        assert_eq!(kopi.apply(&products).len(), 2);

        let food = ProductFilter {
            query: None,
            category: Some("makanan".to_owned()),
        };
        assert_eq!(food.apply(&products).len(), 1);

        let kopi_food = ProductFilter {
            query: Some("kopi".to_owned()),
            category: Some("Makanan".to_owned()),
        };
        assert!(kopi_food.apply(&products).is_empty());

        let all = ProductFilter {
            query: Some("  ".to_owned()),
            category: Some("all".to_owned()),
        };
        assert_eq!(all.apply(&products).len(), 3);
    }

    #[test]
    fn test_categories_and_summary() {
        let products = vec![
            product(1, "Kopi", "Minuman", 10, 1),
            product(2, "Keripik", "Makanan", 3, 2),
            product(3, "Teh", "Minuman", 25, 3),
        ];
        assert_eq!(categories(&products), vec!["Makanan", "Minuman"]);

        let summary = InventorySummary::from_products(&products);
        assert_eq!(summary.product_count, 3);
        assert_eq!(summary.total_units, 38);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.stock_value, Rupiah::from_whole(380_000));
    }
}
