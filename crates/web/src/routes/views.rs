//! View models shared by dashboard pages and the JSON API.

use serde::Serialize;

use tokoku_core::{Cart, CartLine, Product, ProductId, Rupiah, Transaction, TransactionStatus};

use crate::filters::format_datetime;

/// Badge class for a sale status.
#[must_use]
pub const fn status_class(status: TransactionStatus) -> &'static str {
    match status {
        TransactionStatus::Completed => "badge--success",
        TransactionStatus::Pending => "badge--warning",
        TransactionStatus::Cancelled => "badge--danger",
    }
}

/// One inventory table row.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: String,
    /// Plain decimal for the edit form.
    pub price_value: String,
    pub stock: i32,
    pub stock_label: &'static str,
    pub stock_class: &'static str,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let level = product.stock_level();
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            price_value: product.price.amount().normalize().to_string(),
            stock: product.stock,
            stock_label: level.label(),
            stock_class: level.css_class(),
            image_url: product.image_url.clone(),
        }
    }
}

/// One sales history row.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub id: i32,
    pub reference: String,
    pub date: String,
    pub customer: String,
    pub items: String,
    pub unit_count: u64,
    /// Stable status value for client-side filtering.
    pub status: &'static str,
    pub status_label: &'static str,
    pub status_class: &'static str,
    pub payment: &'static str,
    pub channel: &'static str,
    pub total: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        let items = transaction
            .items
            .iter()
            .map(|item| format!("{} ×{}", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            id: transaction.id.as_i32(),
            reference: transaction.reference(),
            date: format_datetime(&transaction.timestamp),
            customer: transaction
                .customer_name
                .clone()
                .unwrap_or_else(|| "Umum".to_owned()),
            items,
            unit_count: transaction.unit_count(),
            status: transaction.status.as_str(),
            status_label: transaction.status.label(),
            status_class: status_class(transaction.status),
            payment: transaction.payment_method.label(),
            channel: transaction.channel.as_str(),
            total: transaction.total.to_string(),
        }
    }
}

/// One cart line with display strings.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub price: Rupiah,
    pub price_label: String,
    pub quantity: u32,
    pub subtotal: Rupiah,
    pub subtotal_label: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let subtotal = line.subtotal();
        Self {
            product_id: line.product_id,
            name: line.name.clone(),
            price: line.price,
            price_label: line.price.to_string(),
            quantity: line.quantity,
            subtotal,
            subtotal_label: subtotal.to_string(),
        }
    }
}

/// The cart as the POS screen shows it.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: Rupiah,
    pub total_label: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let total = cart.total();
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total,
            total_label: total.to_string(),
            item_count: cart.item_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tokoku_core::{
        LineItem, PaymentMethod, SalesChannel, TransactionId, UserId,
    };

    use super::*;

    fn product(stock: i32) -> Product {
        let at = Utc.with_ymd_and_hms(2026, 4, 2, 7, 0, 0).single().expect("date");
        Product {
            id: ProductId::new(4),
            user_id: UserId::new(1),
            name: "Sambal Roa".to_owned(),
            category: "Bumbu".to_owned(),
            price: Rupiah::from_whole(35_000),
            stock,
            image_url: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_product_row_labels() {
        let row = ProductRow::from(&product(3));
        assert_eq!(row.price, "Rp 35.000");
        assert_eq!(row.price_value, "35000");
        assert_eq!(row.stock_label, "Low Stock");
        assert_eq!(row.stock_class, "badge--danger");

        assert_eq!(ProductRow::from(&product(12)).stock_label, "Medium");
        assert_eq!(ProductRow::from(&product(40)).stock_label, "In Stock");
    }

    #[test]
    fn test_transaction_row() {
        let transaction = Transaction {
            id: TransactionId::new(42),
            user_id: UserId::new(1),
            timestamp: Utc.with_ymd_and_hms(2026, 4, 2, 13, 5, 0).single().expect("date"),
            total: Rupiah::from_whole(23_000),
            items: vec![
                LineItem {
                    product_id: None,
                    name: "Kopi".to_owned(),
                    quantity: 2,
                    price: Rupiah::from_whole(7_500),
                },
                LineItem {
                    product_id: None,
                    name: "Roti".to_owned(),
                    quantity: 1,
                    price: Rupiah::from_whole(8_000),
                },
            ],
            status: TransactionStatus::Pending,
            payment_method: PaymentMethod::Qris,
            channel: SalesChannel::Pos,
            customer_name: None,
        };

        let row = TransactionRow::from(&transaction);
        assert_eq!(row.reference, "TRX-000042");
        assert_eq!(row.date, "02 Apr 2026 13:05");
        assert_eq!(row.customer, "Umum");
        assert_eq!(row.items, "Kopi ×2, Roti ×1");
        assert_eq!(row.unit_count, 3);
        assert_eq!(row.status, "pending");
        assert_eq!(row.status_class, "badge--warning");
        assert_eq!(row.payment, "QRIS");
        assert_eq!(row.total, "Rp 23.000");
    }

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        cart.add(&product(10), 2).expect("add");
        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.total_label, "Rp 70.000");
        assert_eq!(
            view.lines.first().map(|l| l.subtotal_label.as_str()),
            Some("Rp 70.000")
        );
    }
}
