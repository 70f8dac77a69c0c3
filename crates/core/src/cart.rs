//! Point-of-sale cart.
//!
//! The cart is a plain value stored in the cashier's session. It never
//! touches inventory; stock is only checked and decremented at checkout.

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::transaction::LineItem;
use crate::types::{ProductId, Rupiah};
use crate::validation::{self, MAX_QUANTITY, ValidationError};

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price captured when the product was added.
    pub price: Rupiah,
    pub quantity: u32,
}

impl CartLine {
    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Rupiah {
        self.price * self.quantity
    }
}

/// Products and quantities rung up for the next sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in the order products were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// Adding zero units is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuantityTooLarge`] when the line would hold
    /// more than [`MAX_QUANTITY`] units; the cart is left unchanged.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), ValidationError> {
        if quantity == 0 {
            return Ok(());
        }
        if let Some(line) = self.line_mut(product.id) {
            let merged = line.quantity.checked_add(quantity).unwrap_or(u32::MAX);
            line.quantity = validation::quantity("quantity", merged)?;
            return Ok(());
        }
        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity: validation::quantity("quantity", quantity)?,
        });
        Ok(())
    }

    /// Remove a product's line. Returns whether it was in the cart.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// Returns whether the product was in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::QuantityTooLarge`] above [`MAX_QUANTITY`].
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<bool, ValidationError> {
        if quantity == 0 {
            return Ok(self.remove(product_id));
        }
        let quantity = validation::quantity("quantity", quantity)?;
        Ok(match self.line_mut(product_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        })
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `price × quantity` over every line.
    #[must_use]
    pub fn total(&self) -> Rupiah {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Total units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Line items for the transaction recorded at checkout.
    #[must_use]
    pub fn to_line_items(&self) -> Vec<LineItem> {
        self.lines
            .iter()
            .map(|line| LineItem {
                product_id: Some(line.product_id),
                name: line.name.clone(),
                quantity: line.quantity,
                price: line.price,
            })
            .collect()
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::UserId;

    fn product(id: i32, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            user_id: UserId::new(1),
            name: format!("Produk {id}"),
            category: "Umum".to_owned(),
            price: Rupiah::from_whole(price),
            stock: 50,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let kopi = product(1, 5_000);
        let mut cart = Cart::new();
        cart.add(&kopi, 1).expect("add");
        cart.add(&kopi, 2).expect("add");
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Rupiah::from_whole(15_000));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product(1, 5_000), 0).expect("add");
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add(&product(1, 5_000), 1).expect("add");
        cart.add(&product(2, 8_000), 1).expect("add");

        assert_eq!(cart.update_quantity(ProductId::new(2), 3), Ok(true));
        assert_eq!(cart.total(), Rupiah::from_whole(29_000));

        assert_eq!(cart.update_quantity(ProductId::new(1), 0), Ok(true));
        assert_eq!(cart.lines().len(), 1);

        assert_eq!(cart.update_quantity(ProductId::new(9), 2), Ok(false));
        assert!(cart.remove(ProductId::new(2)));
        assert!(!cart.remove(ProductId::new(2)));
        assert_eq!(cart.total(), Rupiah::ZERO);
    }

    #[test]
    fn test_quantity_limit_leaves_cart_unchanged() {
        let kopi = product(1, 5_000);
        let mut cart = Cart::new();
        let too_many = ValidationError::QuantityTooLarge {
            field: "quantity",
            max: MAX_QUANTITY,
        };

        assert_eq!(cart.add(&kopi, MAX_QUANTITY + 1), Err(too_many.clone()));
        assert!(cart.is_empty());

        cart.add(&kopi, MAX_QUANTITY).expect("add");
        assert_eq!(cart.add(&kopi, 1), Err(too_many.clone()));
        assert_eq!(cart.add(&kopi, u32::MAX), Err(too_many.clone()));
        assert_eq!(cart.item_count(), MAX_QUANTITY);

        assert_eq!(cart.update_quantity(kopi.id, u32::MAX), Err(too_many));
        assert_eq!(cart.item_count(), MAX_QUANTITY);
    }

    #[test]
    fn test_price_snapshot_survives_catalog_change() {
        let mut teh = product(3, 4_000);
        let mut cart = Cart::new();
        cart.add(&teh, 2).expect("add");
        teh.price = Rupiah::from_whole(6_000);
        cart.add(&teh, 1).expect("add");
        assert_eq!(cart.total(), Rupiah::from_whole(12_000));
    }

    #[test]
    fn test_to_line_items() {
        let mut cart = Cart::new();
        cart.add(&product(1, 5_000), 2).expect("add");
        let items = cart.to_line_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().map(LineItem::subtotal), Some(Rupiah::from_whole(10_000)));
        assert_eq!(items.first().and_then(|i| i.product_id), Some(ProductId::new(1)));
    }

    #[test]
    fn test_session_serialization_round_trip() {
        let mut cart = Cart::new();
        cart.add(&product(7, 2_500), 4).expect("add");
        cart.clear();
        cart.add(&product(8, 1_000), 1).expect("add");
        let json = serde_json::to_value(&cart).expect("serialize");
        let restored: Cart = serde_json::from_value(json).expect("deserialize");
        assert_eq!(restored, cart);
    }
}
