//! # Inventory Rules
//!
//! Availability policy, stock demands and the floor-clamped delta used by
//! deductions and adjustments.
//!
//! ## Stock Plan
//! ```text
//! Cart line (sku, qty)
//!      │
//!      ├── Simple variant           → demand (sku, qty)         if tracked
//!      ├── Bundle, bundle-tracked   → demand (bundle sku, qty)
//!      └── Bundle, not tracked      → demand (child sku, child qty × qty)
//!                                     for every tracked child
//!      │
//!      ▼
//! aggregate_demands → one demand per SKU, sorted by SKU
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::BundleItem;
use crate::validation::ValidationResult;

// =============================================================================
// Availability
// =============================================================================

/// Stock view of one SKU. A missing record is all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    pub sku: String,
    pub quantity_on_hand: i64,
    pub reserved: i64,
    pub available: i64,
}

impl Availability {
    pub fn new(sku: impl Into<String>, quantity_on_hand: i64, reserved: i64) -> Self {
        Availability {
            sku: sku.into(),
            quantity_on_hand,
            reserved,
            available: (quantity_on_hand - reserved).max(0),
        }
    }

    /// Availability of a SKU that has no inventory record.
    pub fn none(sku: impl Into<String>) -> Self {
        Availability::new(sku, 0, 0)
    }
}

/// Checks a requested quantity against availability.
///
/// Untracked variants always pass, whatever stock is recorded.
///
/// ## Example
/// ```rust
/// use mercado_core::inventory::{check_availability, Availability};
///
/// let stock = Availability::new("TAZA-01", 3, 0);
/// assert!(check_availability(true, &stock, 3).is_ok());
/// assert!(check_availability(true, &stock, 4).is_err());
/// assert!(check_availability(false, &stock, 400).is_ok());
/// ```
pub fn check_availability(
    tracked: bool,
    availability: &Availability,
    requested: i64,
) -> CoreResult<()> {
    if !tracked || availability.available >= requested {
        return Ok(());
    }
    Err(CoreError::InsufficientStock {
        sku: availability.sku.clone(),
        available: availability.available,
        requested,
    })
}

// =============================================================================
// Stock Demands
// =============================================================================

/// Units of one SKU a cart line (or a whole cart) needs from inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDemand {
    pub sku: String,
    pub quantity: i64,
}

impl StockDemand {
    pub fn new(sku: impl Into<String>, quantity: i64) -> Self {
        StockDemand {
            sku: sku.into(),
            quantity,
        }
    }
}

/// Child demands for `units` bundles: each child qty times the bundle units.
pub fn bundle_child_demands(items: &[BundleItem], units: i64) -> ValidationResult<Vec<StockDemand>> {
    items
        .iter()
        .map(|item| {
            item.qty
                .checked_mul(units)
                .map(|quantity| StockDemand::new(&item.sku, quantity))
                .ok_or_else(|| ValidationError::Overflow {
                    field: format!("bundleItems.{}.qty", item.sku),
                })
        })
        .collect()
}

/// Merges demands on the same SKU. The result is sorted by SKU, so locks
/// or row updates taken in this order never deadlock against each other.
pub fn aggregate_demands<I>(demands: I) -> Vec<StockDemand>
where
    I: IntoIterator<Item = StockDemand>,
{
    let mut merged: BTreeMap<String, i64> = BTreeMap::new();
    for demand in demands {
        let total = merged.entry(demand.sku).or_insert(0);
        *total = total.saturating_add(demand.quantity);
    }
    merged
        .into_iter()
        .filter(|(_, quantity)| *quantity > 0)
        .map(|(sku, quantity)| StockDemand { sku, quantity })
        .collect()
}

// =============================================================================
// Floor-Clamped Deltas
// =============================================================================

/// Result of applying a delta to an on-hand quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampOutcome {
    pub quantity_on_hand: i64,
    /// Units that could not be removed because stock hit zero.
    pub clamped_units: i64,
}

impl ClampOutcome {
    #[inline]
    pub const fn was_clamped(&self) -> bool {
        self.clamped_units > 0
    }
}

/// Applies `delta` to `on_hand`, never going below zero.
///
/// ```rust
/// use mercado_core::inventory::apply_delta_clamped;
///
/// let outcome = apply_delta_clamped(3, -5);
/// assert_eq!(outcome.quantity_on_hand, 0);
/// assert_eq!(outcome.clamped_units, 2);
/// ```
pub fn apply_delta_clamped(on_hand: i64, delta: i64) -> ClampOutcome {
    let raw = on_hand.saturating_add(delta);
    if raw < 0 {
        ClampOutcome {
            quantity_on_hand: 0,
            clamped_units: -raw,
        }
    } else {
        ClampOutcome {
            quantity_on_hand: raw,
            clamped_units: 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_available_never_negative() {
        let a = Availability::new("A", 2, 5);
        assert_eq!(a.available, 0);
        assert_eq!(Availability::none("A").available, 0);
    }

    #[test]
    fn test_check_reports_shortfall() {
        let err = check_availability(true, &Availability::new("X", 3, 0), 4).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                sku: "X".into(),
                available: 3,
                requested: 4
            }
        );
    }

    #[test]
    fn test_bundle_child_demands_multiply() {
        let items = vec![BundleItem::new("X", 2), BundleItem::new("Y", 1)];
        let demands = bundle_child_demands(&items, 3).unwrap();
        assert_eq!(demands, vec![StockDemand::new("X", 6), StockDemand::new("Y", 3)]);
    }

    #[test]
    fn test_bundle_child_demands_reject_overflow() {
        let items = vec![BundleItem::new("X", i64::MAX / 2)];
        let err = bundle_child_demands(&items, 3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Overflow {
                field: "bundleItems.X.qty".into()
            }
        );
    }

    #[test]
    fn test_aggregate_saturates_instead_of_wrapping() {
        let merged = aggregate_demands(vec![
            StockDemand::new("X", i64::MAX),
            StockDemand::new("X", 5),
        ]);
        assert_eq!(merged, vec![StockDemand::new("X", i64::MAX)]);
    }

    #[test]
    fn test_aggregate_merges_and_sorts() {
        let merged = aggregate_demands(vec![
            StockDemand::new("B", 1),
            StockDemand::new("A", 2),
            StockDemand::new("B", 4),
        ]);
        assert_eq!(merged, vec![StockDemand::new("A", 2), StockDemand::new("B", 5)]);
    }

    #[test]
    fn test_clamp_positive_delta() {
        let outcome = apply_delta_clamped(3, 4);
        assert_eq!(outcome.quantity_on_hand, 7);
        assert!(!outcome.was_clamped());
    }

    proptest! {
        #[test]
        fn on_hand_stays_non_negative(deltas in proptest::collection::vec(-1_000i64..1_000, 0..50)) {
            let mut on_hand = 0i64;
            for delta in deltas {
                let outcome = apply_delta_clamped(on_hand, delta);
                prop_assert!(outcome.quantity_on_hand >= 0);
                prop_assert!(outcome.clamped_units >= 0);
                // clamped units account exactly for the lost delta
                prop_assert_eq!(outcome.quantity_on_hand - outcome.clamped_units, on_hand + delta);
                on_hand = outcome.quantity_on_hand;
            }
        }
    }
}
