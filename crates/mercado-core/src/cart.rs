//! # Cart
//!
//! A user's cart inside one tenant and the line-merging rules.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add_line(sku already present) ──► items[i].qty += qty (price kept)    │
//! │  add_line(new sku) ──────────────► items.push(line)                    │
//! │  remove_item(sku) ───────────────► items.retain(sku != ..)             │
//! │  clear() ────────────────────────► items.clear()                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `sku`
//! - `price_at_add` is frozen when the line is first added
//! - At most `CartLimits::max_lines` lines, each with qty in 1..=`max_item_quantity`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::new_id;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Size limits applied to carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLimits {
    pub max_lines: usize,
    pub max_item_quantity: i64,
}

impl Default for CartLimits {
    fn default() -> Self {
        CartLimits {
            max_lines: MAX_CART_ITEMS,
            max_item_quantity: MAX_ITEM_QUANTITY,
        }
    }
}

/// A line in the cart.
///
/// Title, variant name and price are snapshots taken at add time. They
/// travel unchanged into the order even if the catalog changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub sku: String,
    pub qty: i64,
    pub price_at_add: Money,
    pub currency: String,
    pub product_id: String,
    pub variant_name: Option<String>,
    pub title_snapshot: String,
}

impl CartItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_add.multiply_quantity(self.qty)
    }
}

/// Display title of a line: product title, plus " - variant" when named.
///
/// ```rust
/// use mercado_core::cart::title_snapshot;
///
/// assert_eq!(title_snapshot("Taza", Some("Azul")), "Taza - Azul");
/// assert_eq!(title_snapshot("Taza", None), "Taza");
/// ```
pub fn title_snapshot(title: &str, variant_name: Option<&str>) -> String {
    match variant_name.filter(|name| !name.is_empty()) {
        Some(name) => format!("{title} - {name}"),
        None => title.to_string(),
    }
}

/// One cart per (user, tenant).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub tenant_id: String,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new(user_id: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Cart {
            id: new_id(),
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a line, merging into an existing line for the same SKU.
    ///
    /// A merged line keeps its original price snapshot; only the quantity
    /// grows. Returns the resulting line.
    pub fn add_line(&mut self, line: CartItem, limits: &CartLimits) -> CoreResult<&CartItem> {
        if let Some(index) = self.items.iter().position(|i| i.sku == line.sku) {
            let new_qty = self.items[index].qty.saturating_add(line.qty);
            if new_qty > limits.max_item_quantity {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: limits.max_item_quantity,
                });
            }
            self.items[index].qty = new_qty;
            return Ok(&self.items[index]);
        }

        if line.qty > limits.max_item_quantity {
            return Err(CoreError::QuantityTooLarge {
                requested: line.qty,
                max: limits.max_item_quantity,
            });
        }

        if self.items.len() >= limits.max_lines {
            return Err(CoreError::CartTooLarge {
                max: limits.max_lines,
            });
        }

        self.items.push(line);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Quantity of `sku` already in the cart (0 if absent).
    pub fn quantity_of(&self, sku: &str) -> i64 {
        self.items
            .iter()
            .find(|i| i.sku == sku)
            .map_or(0, |i| i.qty)
    }

    /// Removes the line for `sku`. Returns false if there was none.
    pub fn remove_item(&mut self, sku: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.sku != sku);
        self.items.len() != initial_len
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.qty).sum()
    }

    /// Sum of line totals at their snapshot prices.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sku: &str, qty: i64, price_major: i64) -> CartItem {
        CartItem {
            sku: sku.to_string(),
            qty,
            price_at_add: Money::from_major(price_major),
            currency: "MXN".to_string(),
            product_id: format!("prod-{sku}"),
            variant_name: None,
            title_snapshot: format!("Product {sku}"),
        }
    }

    #[test]
    fn test_add_same_sku_accumulates_and_keeps_first_price() {
        let mut cart = Cart::new("u1", "t1");
        let limits = CartLimits::default();

        cart.add_line(line("A", 2, 100), &limits).unwrap();
        let merged = cart.add_line(line("A", 3, 80), &limits).unwrap();

        assert_eq!(merged.qty, 5);
        assert_eq!(merged.price_at_add, Money::from_major(100));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.subtotal(), Money::from_major(500));
    }

    #[test]
    fn test_limits() {
        let mut cart = Cart::new("u1", "t1");
        let limits = CartLimits {
            max_lines: 1,
            max_item_quantity: 10,
        };

        cart.add_line(line("A", 6, 1), &limits).unwrap();
        assert!(matches!(
            cart.add_line(line("A", 5, 1), &limits),
            Err(CoreError::QuantityTooLarge { requested: 11, max: 10 })
        ));
        assert!(matches!(
            cart.add_line(line("B", 1, 1), &limits),
            Err(CoreError::CartTooLarge { max: 1 })
        ));
        assert_eq!(cart.quantity_of("A"), 6);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new("u1", "t1");
        let limits = CartLimits::default();
        cart.add_line(line("A", 1, 10), &limits).unwrap();
        cart.add_line(line("B", 2, 10), &limits).unwrap();

        assert!(cart.remove_item("A"));
        assert!(!cart.remove_item("A"));
        assert_eq!(cart.total_quantity(), 2);

        cart.clear();
        assert!(cart.is_empty());
    }
}
