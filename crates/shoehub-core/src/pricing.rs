//! # Pricing Engine
//!
//! Computes order totals from line items.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line_total   = unit_price × quantity          (per item, exact)       │
//! │  subtotal     = Σ line_total                   (exact)                 │
//! │  tax_amount   = round(subtotal × 11%)          (half away from zero)   │
//! │  total_amount = subtotal + tax_amount - discount_amount                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unit prices are snapshots of the product's `base_price` taken when the
//! order is created. Totals are computed once and stored; they are never
//! recomputed from the catalog afterwards.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1100 bps = 11%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

/// The fixed order tax: 11% of the subtotal.
pub const TAX_RATE: TaxRate = TaxRate::from_bps(1100);

// =============================================================================
// Discount Policy
// =============================================================================

/// What to do with a discount larger than the taxed subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// Refuse the order with a validation error on `discount_amount`.
    #[default]
    Reject,
    /// Reduce the discount so the total lands exactly on zero.
    Clamp,
    /// Accept the discount and let the total go negative.
    AllowNegative,
}

impl std::str::FromStr for DiscountPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(DiscountPolicy::Reject),
            "clamp" => Ok(DiscountPolicy::Clamp),
            "allow_negative" | "allow-negative" => Ok(DiscountPolicy::AllowNegative),
            other => Err(ValidationError::NotAllowed {
                field: "discount_policy".to_string(),
                value: other.to_string(),
                allowed: vec![
                    "reject".to_string(),
                    "clamp".to_string(),
                    "allow_negative".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// One priced line: a unit price snapshot and a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLine {
    pub unit_price: Money,
    pub quantity: i64,
}

impl PriceLine {
    pub fn new(unit_price: Money, quantity: i64) -> Self {
        PriceLine {
            unit_price,
            quantity,
        }
    }

    /// `unit_price × quantity`, checked for overflow.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.unit_price
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: "line total".to_string(),
            })
    }
}

/// The four stored order amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
}

impl OrderTotals {
    /// Checks `total == subtotal + tax - discount`.
    pub fn is_consistent(&self) -> bool {
        self.total_amount == self.subtotal + self.tax_amount - self.discount_amount
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices an order.
///
/// ## Errors
/// - `discount` negative → `ValidationError::Negative`
/// - discount above `subtotal + tax` under `DiscountPolicy::Reject`
///   → `ValidationError::DiscountTooLarge`
/// - arithmetic overflow → `CoreError::AmountOverflow`
///
/// ## Example
/// ```rust
/// use shoehub_core::money::Money;
/// use shoehub_core::pricing::{price_order, DiscountPolicy, PriceLine};
///
/// let lines = [
///     PriceLine::new(Money::from_major(100_000), 2),
///     PriceLine::new(Money::from_major(50_000), 1),
/// ];
/// let totals = price_order(&lines, Money::zero(), DiscountPolicy::Reject).unwrap();
/// assert_eq!(totals.subtotal, Money::from_major(250_000));
/// assert_eq!(totals.tax_amount, Money::from_major(27_500));
/// assert_eq!(totals.total_amount, Money::from_major(277_500));
/// ```
pub fn price_order(
    lines: &[PriceLine],
    discount: Money,
    policy: DiscountPolicy,
) -> CoreResult<OrderTotals> {
    if discount.is_negative() {
        return Err(ValidationError::Negative {
            field: "discount_amount".to_string(),
        }
        .into());
    }

    let mut subtotal = Money::zero();
    for line in lines {
        subtotal = subtotal
            .checked_add(line.line_total()?)
            .ok_or_else(|| CoreError::AmountOverflow {
                context: "subtotal".to_string(),
            })?;
    }

    let tax_amount = subtotal.calculate_tax(TAX_RATE);
    let taxed = subtotal
        .checked_add(tax_amount)
        .ok_or_else(|| CoreError::AmountOverflow {
            context: "total".to_string(),
        })?;

    let discount_amount = if discount > taxed {
        match policy {
            DiscountPolicy::Reject => {
                return Err(ValidationError::DiscountTooLarge {
                    field: "discount_amount".to_string(),
                    discount: discount.to_string(),
                    limit: taxed.to_string(),
                }
                .into())
            }
            DiscountPolicy::Clamp => taxed,
            DiscountPolicy::AllowNegative => discount,
        }
    } else {
        discount
    };

    Ok(OrderTotals {
        subtotal,
        tax_amount,
        discount_amount,
        total_amount: taxed - discount_amount,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
