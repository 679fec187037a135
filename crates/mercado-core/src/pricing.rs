//! # Pricing
//!
//! Price resolution for variants and the bundle pricing modes.
//!
//! ## Resolution Rule
//! ```text
//! active_type (None → DEFAULT)
//!      │
//!      ├── OFFER     and offer present      → (offer, OFFER)
//!      ├── CLEARANCE and clearance present  → (clearance, CLEARANCE)
//!      └── anything else                    → (default, DEFAULT)
//! ```
//!
//! ## Bundle Modes
//! ```text
//! FIXED              bundle variant's own resolved price
//! SUM                Σ child resolved price × child qty
//! SUM_WITH_DISCOUNT  SUM × (1 - pct/100), rounded to whole units, ≥ 0
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{PriceType, Pricing};
use crate::validation::ValidationResult;

/// Effective price of a variant and which price it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPrice {
    pub price: Money,
    pub price_type: PriceType,
}

/// Resolves the effective price of a pricing record. Never fails.
pub fn resolve_price(pricing: &Pricing) -> ResolvedPrice {
    match (pricing.active_type.unwrap_or_default(), pricing.offer, pricing.clearance) {
        (PriceType::Offer, Some(offer), _) => ResolvedPrice {
            price: offer,
            price_type: PriceType::Offer,
        },
        (PriceType::Clearance, _, Some(clearance)) => ResolvedPrice {
            price: clearance,
            price_type: PriceType::Clearance,
        },
        _ => ResolvedPrice {
            price: pricing.default,
            price_type: PriceType::Default,
        },
    }
}

// =============================================================================
// Bundle Pricing
// =============================================================================

/// How a bundle's unit price is computed at add-to-cart time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BundlePriceMode {
    #[default]
    Fixed,
    Sum,
    SumWithDiscount,
}

/// Discount percentage clamped into 0..=100, held in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountPct(u32);

impl DiscountPct {
    pub const MAX_BPS: u32 = 10_000;

    /// Clamps a caller-supplied percentage. NaN counts as no discount.
    ///
    /// ```rust
    /// use mercado_core::pricing::DiscountPct;
    ///
    /// assert_eq!(DiscountPct::from_percent(25.0).bps(), 2500);
    /// assert_eq!(DiscountPct::from_percent(140.0).bps(), 10_000);
    /// assert_eq!(DiscountPct::from_percent(-3.0).bps(), 0);
    /// ```
    pub fn from_percent(pct: f64) -> Self {
        if pct.is_nan() {
            return DiscountPct(0);
        }
        let clamped = pct.clamp(0.0, 100.0);
        DiscountPct((clamped * 100.0).round() as u32)
    }

    pub const fn from_bps(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            DiscountPct(Self::MAX_BPS)
        } else {
            DiscountPct(bps)
        }
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    pub const fn zero() -> Self {
        DiscountPct(0)
    }
}

/// A bundle child's resolved unit price and per-bundle quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentPrice {
    pub unit_price: Money,
    pub qty: i64,
}

/// Sums child prices weighted by their per-bundle quantity.
pub fn sum_components(components: &[ComponentPrice]) -> ValidationResult<Money> {
    components.iter().try_fold(Money::zero(), |acc, c| {
        c.unit_price
            .checked_multiply_quantity(c.qty)
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| ValidationError::Overflow {
                field: "bundle price".to_string(),
            })
    })
}

/// Computes the unit price of one bundle.
///
/// `own` is the bundle variant's pricing, used by FIXED. The summing modes
/// are classified as DEFAULT prices.
///
/// ## Example
/// ```rust
/// use mercado_core::money::Money;
/// use mercado_core::pricing::{bundle_unit_price, BundlePriceMode, ComponentPrice, DiscountPct};
/// use mercado_core::types::{PriceType, Pricing};
///
/// let own = Pricing::new(Money::from_major(280));
/// let children = [
///     ComponentPrice { unit_price: Money::from_major(100), qty: 1 },
///     ComponentPrice { unit_price: Money::from_major(200), qty: 1 },
/// ];
///
/// let price = bundle_unit_price(
///     BundlePriceMode::SumWithDiscount,
///     &own,
///     &children,
///     DiscountPct::from_percent(25.0),
/// )
/// .unwrap();
/// assert_eq!(price.price, Money::from_major(225));
/// assert_eq!(price.price_type, PriceType::Default);
/// ```
pub fn bundle_unit_price(
    mode: BundlePriceMode,
    own: &Pricing,
    components: &[ComponentPrice],
    discount: DiscountPct,
) -> ValidationResult<ResolvedPrice> {
    let resolved = match mode {
        BundlePriceMode::Fixed => resolve_price(own),
        BundlePriceMode::Sum => ResolvedPrice {
            price: sum_components(components)?,
            price_type: PriceType::Default,
        },
        BundlePriceMode::SumWithDiscount => ResolvedPrice {
            price: sum_components(components)?.discounted_to_whole_major(discount.bps()),
            price_type: PriceType::Default,
        },
    };
    Ok(resolved)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_defaults_when_no_active_type() {
        let mut pricing = Pricing::new(Money::from_major(120));
        pricing.offer = Some(Money::from_major(99));
        let resolved = resolve_price(&pricing);
        assert_eq!(resolved.price, Money::from_major(120));
        assert_eq!(resolved.price_type, PriceType::Default);
    }

    #[test]
    fn test_resolve_offer_and_clearance() {
        let offer = Pricing::new(Money::from_major(120)).with_offer(Money::from_major(99));
        assert_eq!(resolve_price(&offer).price_type, PriceType::Offer);

        let clearance = Pricing::new(Money::from_major(120)).with_clearance(Money::from_major(60));
        let resolved = resolve_price(&clearance);
        assert_eq!(resolved.price, Money::from_major(60));
        assert_eq!(resolved.price_type, PriceType::Clearance);
    }

    #[test]
    fn test_resolve_falls_back_when_active_price_missing() {
        let mut pricing = Pricing::new(Money::from_major(120));
        pricing.active_type = Some(PriceType::Clearance);
        pricing.offer = Some(Money::from_major(99));
        let resolved = resolve_price(&pricing);
        assert_eq!(resolved.price, Money::from_major(120));
        assert_eq!(resolved.price_type, PriceType::Default);
    }

    #[test]
    fn test_bundle_modes() {
        let own = Pricing::new(Money::from_major(250)).with_offer(Money::from_major(240));
        let children = [
            ComponentPrice {
                unit_price: Money::from_major(100),
                qty: 1,
            },
            ComponentPrice {
                unit_price: Money::from_major(50),
                qty: 4,
            },
        ];

        let fixed = bundle_unit_price(BundlePriceMode::Fixed, &own, &children, DiscountPct::zero()).unwrap();
        assert_eq!(fixed.price, Money::from_major(240));
        assert_eq!(fixed.price_type, PriceType::Offer);

        let sum = bundle_unit_price(BundlePriceMode::Sum, &own, &children, DiscountPct::zero()).unwrap();
        assert_eq!(sum.price, Money::from_major(300));
        assert_eq!(sum.price_type, PriceType::Default);

        let full = bundle_unit_price(
            BundlePriceMode::SumWithDiscount,
            &own,
            &children,
            DiscountPct::from_percent(100.0),
        )
        .unwrap();
        assert_eq!(full.price, Money::zero());
    }

    #[test]
    fn test_summing_modes_report_overflow() {
        let own = Pricing::new(Money::from_major(10));
        let children = [ComponentPrice {
            unit_price: Money::from_minor(i64::MAX / 2),
            qty: 3,
        }];

        for mode in [BundlePriceMode::Sum, BundlePriceMode::SumWithDiscount] {
            let err = bundle_unit_price(mode, &own, &children, DiscountPct::zero()).unwrap_err();
            assert!(matches!(err, ValidationError::Overflow { .. }));
        }
        // FIXED never looks at the children
        assert!(bundle_unit_price(BundlePriceMode::Fixed, &own, &children, DiscountPct::zero()).is_ok());
    }

    #[test]
    fn test_discount_pct_clamps() {
        assert_eq!(DiscountPct::from_percent(f64::NAN), DiscountPct::zero());
        assert_eq!(DiscountPct::from_percent(12.5).bps(), 1250);
        assert_eq!(DiscountPct::from_bps(20_000).bps(), 10_000);
    }

    fn pricing_strategy() -> impl Strategy<Value = Pricing> {
        (
            1i64..1_000_000,
            proptest::option::of(1i64..1_000_000),
            proptest::option::of(1i64..1_000_000),
            proptest::option::of(prop_oneof![
                Just(PriceType::Default),
                Just(PriceType::Offer),
                Just(PriceType::Clearance),
            ]),
        )
            .prop_map(|(default, offer, clearance, active_type)| Pricing {
                default: Money::from_minor(default),
                offer: offer.map(Money::from_minor),
                clearance: clearance.map(Money::from_minor),
                active_type,
                currency: "MXN".to_string(),
            })
    }

    proptest! {
        #[test]
        fn resolved_price_is_consistent_with_presence(pricing in pricing_strategy()) {
            let resolved = resolve_price(&pricing);
            match resolved.price_type {
                PriceType::Offer => {
                    prop_assert_eq!(pricing.active_type, Some(PriceType::Offer));
                    prop_assert_eq!(Some(resolved.price), pricing.offer);
                }
                PriceType::Clearance => {
                    prop_assert_eq!(pricing.active_type, Some(PriceType::Clearance));
                    prop_assert_eq!(Some(resolved.price), pricing.clearance);
                }
                PriceType::Default => {
                    prop_assert_eq!(resolved.price, pricing.default);
                    let offer_applies = pricing.active_type == Some(PriceType::Offer) && pricing.offer.is_some();
                    let clearance_applies = pricing.active_type == Some(PriceType::Clearance) && pricing.clearance.is_some();
                    prop_assert!(!offer_applies && !clearance_applies);
                }
            }
        }

        #[test]
        fn discounted_sum_never_negative_or_above_sum(
            prices in proptest::collection::vec((0i64..100_000, 1i64..10), 0..6),
            pct in -50.0f64..150.0,
        ) {
            let components: Vec<ComponentPrice> = prices
                .iter()
                .map(|&(p, q)| ComponentPrice { unit_price: Money::from_minor(p), qty: q })
                .collect();
            let own = Pricing::new(Money::from_major(1));
            let sum = sum_components(&components).unwrap();
            let resolved = bundle_unit_price(
                BundlePriceMode::SumWithDiscount,
                &own,
                &components,
                DiscountPct::from_percent(pct),
            )
            .unwrap();
            prop_assert!(!resolved.price.is_negative());
            // rounding to whole units can add at most half a unit
            prop_assert!(resolved.price.minor_units() <= sum.minor_units() + 50);
            prop_assert_eq!(resolved.price.minor_part(), 0);
        }
    }
}
