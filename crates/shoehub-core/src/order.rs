//! # Order Aggregate
//!
//! Pure construction and update rules for orders.
//!
//! ## Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NewOrder ──► validate_new_order (shape, delivery date, discount sign) │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │  products ──► OrderDraft::build                                         │
//! │                   ├── each item checked against its product            │
//! │                   ├── unit_price = product.base_price (snapshot)       │
//! │                   └── price_order → OrderTotals                        │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │  shoehub-db persists the draft with an allocated order number          │
//! │  (status = pending, payment_status = pending)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::{price_order, DiscountPolicy, OrderTotals, PriceLine};
use crate::types::{
    Customizations, NewOrder, Order, OrderStatus, OrderUpdate, PaymentStatus, Product,
};
use crate::validation::{validate_item_against_product, validate_new_order, validate_order_update};

// =============================================================================
// Status Policy
// =============================================================================

/// How order updates treat `status` and `payment_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Any enumerated value is accepted; the two fields are unrelated.
    #[default]
    Independent,
    /// Transition tables apply, and `delivered` requires `paid`.
    Strict,
}

impl FromStr for StatusPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "independent" => Ok(StatusPolicy::Independent),
            "strict" => Ok(StatusPolicy::Strict),
            other => Err(ValidationError::NotAllowed {
                field: "status_policy".to_string(),
                value: other.to_string(),
                allowed: vec!["independent".to_string(), "strict".to_string()],
            }),
        }
    }
}

/// Checks an update against the current order under `policy`.
///
/// A supplied `expected_delivery` must fall after the day the order was
/// created; the current date plays no part, so overdue orders stay editable.
///
/// ## Errors
/// - notes too long / delivery date not after creation → `CoreError::Validation`
/// - strict policy, disallowed move → `CoreError::InvalidTransition`
pub fn check_update(current: &Order, update: &OrderUpdate, policy: StatusPolicy) -> CoreResult<()> {
    validate_order_update(update, current.created_at.date_naive())?;

    if policy == StatusPolicy::Independent {
        return Ok(());
    }

    if !current.status.can_transition_to(update.status) {
        return Err(invalid_transition("status", current.status, update.status));
    }

    if !current
        .payment_status
        .can_transition_to(update.payment_status)
    {
        return Err(invalid_transition(
            "payment_status",
            current.payment_status,
            update.payment_status,
        ));
    }

    if update.status == OrderStatus::Delivered
        && current.status != OrderStatus::Delivered
        && update.payment_status != PaymentStatus::Paid
    {
        return Err(invalid_transition(
            "status",
            current.status,
            update.status,
        ));
    }

    Ok(())
}

fn invalid_transition(field: &str, from: impl ToString, to: impl ToString) -> CoreError {
    CoreError::InvalidTransition {
        field: field.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

// =============================================================================
// Order Draft
// =============================================================================

/// A priced line ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
    pub size: String,
    pub color: String,
    pub customizations: Option<Customizations>,
    pub special_notes: Option<String>,
}

/// A validated, priced order that has not been numbered or stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub customer_id: i64,
    pub items: Vec<DraftItem>,
    pub totals: OrderTotals,
    pub notes: Option<String>,
    pub expected_delivery: Option<NaiveDate>,
}

impl OrderDraft {
    /// Validates `order` and prices it from the given products.
    ///
    /// `products` must hold every product the items reference; a missing
    /// entry is reported against that item's `product_id`.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let draft = OrderDraft::build(&new_order, &products, DiscountPolicy::Reject, today)?;
    /// assert!(draft.totals.is_consistent());
    /// ```
    pub fn build(
        order: &NewOrder,
        products: &HashMap<i64, Product>,
        discount_policy: DiscountPolicy,
        today: NaiveDate,
    ) -> CoreResult<Self> {
        validate_new_order(order, today)?;

        let mut items = Vec::with_capacity(order.items.len());
        let mut lines = Vec::with_capacity(order.items.len());

        for (i, input) in order.items.iter().enumerate() {
            let prefix = format!("items[{}]", i);
            let product = products.get(&input.product_id).ok_or_else(|| {
                ValidationError::InvalidFormat {
                    field: "product_id".to_string(),
                    reason: format!("unknown product {}", input.product_id),
                }
                .within(&prefix)
            })?;

            validate_item_against_product(input, product).map_err(|e| e.within(&prefix))?;

            let line = PriceLine::new(product.base_price, input.quantity);
            let total_price = line.line_total()?;
            lines.push(line);

            items.push(DraftItem {
                product_id: product.id,
                quantity: input.quantity,
                unit_price: product.base_price,
                total_price,
                size: input.size.trim().to_string(),
                color: input.color.trim().to_string(),
                customizations: input.customizations.clone().filter(|c| !c.is_empty()),
                special_notes: input.special_notes.clone(),
            });
        }

        let totals = price_order(&lines, order.discount_amount, discount_policy)?;

        Ok(OrderDraft {
            customer_id: order.customer_id,
            items,
            totals,
            notes: order.notes.clone(),
            expected_delivery: order.expected_delivery,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderItemInput;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn product(id: i64, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id,
            category_id: 1,
            name: format!("Model {}", id),
            description: None,
            base_price: Money::from_major(price),
            available_sizes: vec!["40".to_string(), "41".to_string()],
            available_colors: vec!["black".to_string()],
            customization_options: None,
            image_url: None,
            is_customizable: false,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn catalog() -> HashMap<i64, Product> {
        [product(1, 100_000), product(2, 50_000)]
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    }

    fn line(product_id: i64, quantity: i64) -> OrderItemInput {
        OrderItemInput {
            product_id,
            quantity,
            size: "40".to_string(),
            color: "black".to_string(),
            customizations: None,
            special_notes: None,
        }
    }

    fn new_order(items: Vec<OrderItemInput>) -> NewOrder {
        NewOrder {
            customer_id: 3,
            items,
            discount_amount: Money::zero(),
            notes: None,
            expected_delivery: None,
        }
    }

    fn stored_order(status: OrderStatus, payment_status: PaymentStatus) -> Order {
        let now = today().and_hms_opt(12, 0, 0).unwrap().and_utc();
        Order {
            id: 1,
            order_number: "SH-2026-000001".to_string(),
            customer_id: 3,
            subtotal: Money::zero(),
            tax_amount: Money::zero(),
            discount_amount: Money::zero(),
            total_amount: Money::zero(),
            status,
            payment_status,
            notes: None,
            expected_delivery: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn update(status: OrderStatus, payment_status: PaymentStatus) -> OrderUpdate {
        OrderUpdate {
            status,
            payment_status,
            notes: None,
            expected_delivery: None,
        }
    }

    #[test]
    fn test_build_prices_from_snapshot() {
        let draft = OrderDraft::build(
            &new_order(vec![line(1, 2), line(2, 1)]),
            &catalog(),
            DiscountPolicy::Reject,
            today(),
        )
        .unwrap();

        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[0].unit_price, Money::from_major(100_000));
        assert_eq!(draft.items[0].total_price, Money::from_major(200_000));
        assert_eq!(draft.totals.subtotal, Money::from_major(250_000));
        assert_eq!(draft.totals.tax_amount, Money::from_major(27_500));
        assert_eq!(draft.totals.total_amount, Money::from_major(277_500));
    }

    #[test]
    fn test_subtotal_equals_sum_of_lines() {
        let draft = OrderDraft::build(
            &new_order(vec![line(2, 3), line(1, 1), line(2, 7)]),
            &catalog(),
            DiscountPolicy::Reject,
            today(),
        )
        .unwrap();
        let sum: Money = draft.items.iter().map(|i| i.total_price).sum();
        assert_eq!(draft.totals.subtotal, sum);
        assert!(draft.totals.is_consistent());
    }

    #[test]
    fn test_unknown_product_names_item() {
        let err = OrderDraft::build(
            &new_order(vec![line(1, 1), line(99, 1)]),
            &catalog(),
            DiscountPolicy::Reject,
            today(),
        )
        .unwrap_err();
        match err {
            CoreError::Validation(v) => assert_eq!(v.field(), "items[1].product_id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_customizations_rejected_for_plain_product() {
        let mut item = line(1, 1);
        let mut chosen = Customizations::new();
        chosen.insert("sole".to_string(), "eva".to_string());
        item.customizations = Some(chosen);

        let err = OrderDraft::build(
            &new_order(vec![item]),
            &catalog(),
            DiscountPolicy::Reject,
            today(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_independent_policy_accepts_any_values() {
        let current = stored_order(OrderStatus::Delivered, PaymentStatus::Paid);
        let upd = update(OrderStatus::Pending, PaymentStatus::Refunded);
        assert!(check_update(&current, &upd, StatusPolicy::Independent).is_ok());
    }

    #[test]
    fn test_strict_policy_enforces_tables() {
        let current = stored_order(OrderStatus::Confirmed, PaymentStatus::Pending);

        let ok = update(OrderStatus::InProduction, PaymentStatus::Partial);
        assert!(check_update(&current, &ok, StatusPolicy::Strict).is_ok());

        let backwards = update(OrderStatus::Pending, PaymentStatus::Pending);
        let err = check_update(&current, &backwards, StatusPolicy::Strict).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { ref field, .. } if field == "status"));

        let refund = update(OrderStatus::Confirmed, PaymentStatus::Refunded);
        let err = check_update(&current, &refund, StatusPolicy::Strict).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidTransition { ref field, .. } if field == "payment_status")
        );
    }

    #[test]
    fn test_strict_delivery_requires_payment() {
        let current = stored_order(OrderStatus::Shipped, PaymentStatus::Partial);

        let unpaid = update(OrderStatus::Delivered, PaymentStatus::Partial);
        assert!(check_update(&current, &unpaid, StatusPolicy::Strict).is_err());

        let paid = update(OrderStatus::Delivered, PaymentStatus::Paid);
        assert!(check_update(&current, &paid, StatusPolicy::Strict).is_ok());
    }

    #[test]
    fn test_update_delivery_date_measured_from_creation() {
        let current = stored_order(OrderStatus::Pending, PaymentStatus::Pending);
        let mut upd = update(OrderStatus::Pending, PaymentStatus::Pending);

        upd.expected_delivery = Some(today());
        let err = check_update(&current, &upd, StatusPolicy::Independent).unwrap_err();
        match err {
            CoreError::Validation(v) => assert_eq!(v.field(), "expected_delivery"),
            other => panic!("unexpected error: {other}"),
        }

        // a date already in the past is fine as long as it follows creation
        upd.expected_delivery = today().succ_opt();
        assert!(check_update(&current, &upd, StatusPolicy::Independent).is_ok());
    }

    #[test]
    fn test_build_trims_size_and_color() {
        let mut padded = line(1, 1);
        padded.size = " 40 ".to_string();
        padded.color = "black ".to_string();

        let draft = OrderDraft::build(
            &new_order(vec![padded]),
            &catalog(),
            DiscountPolicy::Reject,
            today(),
        )
        .unwrap();
        assert_eq!(draft.items[0].size, "40");
        assert_eq!(draft.items[0].color, "black");
    }

    #[test]
    fn test_status_policy_from_str() {
        assert_eq!("STRICT".parse::<StatusPolicy>().unwrap(), StatusPolicy::Strict);
        assert!("loose".parse::<StatusPolicy>().is_err());
    }
}
