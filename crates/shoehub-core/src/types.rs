//! # Domain Types
//!
//! Core domain types used throughout ShoeHub.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────┐  owns   ┌─────────────┐  owns   ┌─────────────┐       │
//! │  │  Customer   │────────►│    Order    │────────►│  OrderItem  │       │
//! │  │  status     │  0..n   │ order_number│  1..n   │ unit_price  │       │
//! │  └─────────────┘         │ totals      │         │ (snapshot)  │       │
//! │                          │ status      │         │ size/color  │       │
//! │  ┌─────────────┐         │ pay status  │         └──────┬──────┘       │
//! │  │  Category   │         └──────┬──────┘                │ refs         │
//! │  └──────┬──────┘                │ 0..1                  ▼              │
//! │         │ 1..n           ┌──────▼──────┐         ┌─────────────┐       │
//! │         └───────────────►│    Sale     │         │   Product   │       │
//! │              (products)  │ amount      │         │ base_price  │       │
//! │                          │ method      │         │ sizes/colors│       │
//! │                          └─────────────┘         └─────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are SQLite integer row ids. Order numbers are the
//! human-readable business key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::OrderTotals;

/// Allowed customization parts and their values, e.g.
/// `{"upper": ["canvas", "leather"], "sole": ["rubber", "eva"]}`.
pub type CustomizationOptions = BTreeMap<String, Vec<String>>;

/// Chosen customization per part, e.g. `{"upper": "leather"}`.
pub type Customizations = BTreeMap<String, String>;

/// Parses one of a closed set of string values, naming the field on failure.
fn parse_variant<T: Copy>(
    field: &str,
    value: &str,
    all: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T, ValidationError> {
    let wanted = value.trim().to_lowercase();
    all.iter()
        .find(|v| name(v) == wanted)
        .copied()
        .ok_or_else(|| ValidationError::NotAllowed {
            field: field.to_string(),
            value: value.to_string(),
            allowed: all.iter().map(|v| name(v).to_string()).collect(),
        })
}

// =============================================================================
// Order Status
// =============================================================================

/// Production status of an order.
///
/// ```text
/// pending → confirmed → in_production → ready → shipped → delivered
///    │          │             │           │        │
///    └──────────┴─────────────┴───────────┴────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    InProduction,
    Ready,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::InProduction => "in_production",
            OrderStatus::Ready => "ready",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Position along the production line; `None` for `cancelled`.
    fn stage(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::InProduction => Some(2),
            OrderStatus::Ready => Some(3),
            OrderStatus::Shipped => Some(4),
            OrderStatus::Delivered => Some(5),
            OrderStatus::Cancelled => None,
        }
    }

    /// `delivered` and `cancelled` end the lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Transition table used by the strict status policy.
    ///
    /// Staying put is always allowed. Otherwise the order may move forward
    /// along the production line (skipping stages is fine) or be cancelled,
    /// as long as it is not already terminal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (_, None) => true,
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("status", s, &OrderStatus::ALL, OrderStatus::as_str)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment progress of an order.
///
/// ```text
/// pending → partial → paid → refunded
///    └───────────────►┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Partial,
        PaymentStatus::Paid,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }

    /// Transition table used by the strict status policy.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Pending)
                | (Pending, Partial)
                | (Pending, Paid)
                | (Partial, Partial)
                | (Partial, Paid)
                | (Paid, Paid)
                | (Paid, Refunded)
                | (Refunded, Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("payment_status", s, &PaymentStatus::ALL, PaymentStatus::as_str)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    CreditCard,
    EWallet,
}

impl PaymentMethod {
    /// Declaration order; also the order of per-method report rows.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::BankTransfer,
        PaymentMethod::CreditCard,
        PaymentMethod::EWallet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::EWallet => "e_wallet",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("payment_method", s, &PaymentMethod::ALL, PaymentMethod::as_str)
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
}

impl CustomerStatus {
    pub const ALL: [CustomerStatus; 2] = [CustomerStatus::Active, CustomerStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "active",
            CustomerStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_variant("status", s, &CustomerStatus::ALL, CustomerStatus::as_str)
    }
}

/// A customer of the workshop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub status: CustomerStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Customer form input (create and update).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    #[serde(default)]
    pub status: CustomerStatus,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Product
// =============================================================================

/// A shoe model in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current list price. Orders copy it into `OrderItem::unit_price`.
    pub base_price: Money,
    /// Ordered list of sizes, e.g. `["38", "39", "40"]`.
    pub available_sizes: Vec<String>,
    pub available_colors: Vec<String>,
    pub customization_options: Option<CustomizationOptions>,
    pub image_url: Option<String>,
    pub is_customizable: bool,
    pub active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn offers_size(&self, size: &str) -> bool {
        self.available_sizes.iter().any(|s| s == size)
    }

    pub fn offers_color(&self, color: &str) -> bool {
        self.available_colors.iter().any(|c| c == color)
    }
}

/// Product form input (create and update).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub base_price: Money,
    pub available_sizes: Vec<String>,
    pub available_colors: Vec<String>,
    pub customization_options: Option<CustomizationOptions>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_customizable: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

// =============================================================================
// Order
// =============================================================================

/// An order header. Totals are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    /// `SH-YYYY-NNNNNN`, assigned once.
    pub order_number: String,
    pub customer_id: i64,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub discount_amount: Money,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_delivery: Option<NaiveDate>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn totals(&self) -> OrderTotals {
        OrderTotals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            discount_amount: self.discount_amount,
            total_amount: self.total_amount,
        }
    }
}

/// A line item. Product data is snapshotted at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// The product's `base_price` when the order was placed.
    pub unit_price: Money,
    /// `unit_price × quantity`.
    pub total_price: Money,
    pub size: String,
    pub color: String,
    pub customizations: Option<Customizations>,
    pub special_notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i64,
    pub size: String,
    pub color: String,
    pub customizations: Option<Customizations>,
    pub special_notes: Option<String>,
}

/// Order creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub customer_id: i64,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub discount_amount: Money,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_delivery: Option<NaiveDate>,
}

/// Order update request. Items are not editable through this path.
///
/// `notes` and `expected_delivery` are partial: `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expected_delivery: Option<NaiveDate>,
}

/// An order together with everything it owns (order detail screen).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub sale: Option<Sale>,
}

/// An order row for listings and the dashboard's recent orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSummary {
    pub order: Order,
    pub customer_name: String,
    pub item_count: i64,
}

// =============================================================================
// Sale
// =============================================================================

/// The payment record finalizing an order (at most one per order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    pub order_id: i64,
    pub amount: Money,
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    pub payment_notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub order_id: i64,
    pub amount: Money,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    pub payment_notes: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(CustomerStatus::default(), CustomerStatus::Active);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "in_production".parse::<OrderStatus>().unwrap(),
            OrderStatus::InProduction
        );
        assert_eq!("PAID".parse::<PaymentStatus>().unwrap(), PaymentStatus::Paid);
        assert_eq!(
            "e_wallet".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::EWallet
        );

        let err = "lost".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.field(), "status");
        let err = "cheque".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.field(), "payment_method");
    }

    #[test]
    fn test_serde_names_match_storage_names() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
        }
    }

    #[test]
    fn test_order_status_transitions() {
        use OrderStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Ready));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(InProduction.can_transition_to(Cancelled));
        assert!(Ready.can_transition_to(Ready));

        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(Delivered.is_terminal());
        assert!(!Shipped.is_terminal());
    }

    #[test]
    fn test_payment_status_transitions() {
        use PaymentStatus::*;

        assert!(Pending.can_transition_to(Partial));
        assert!(Partial.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Refunded));

        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Refunded.can_transition_to(Paid));
    }

    #[test]
    fn test_new_order_discount_defaults_to_zero() {
        let json = r#"{
            "customer_id": 1,
            "items": [{"product_id": 2, "quantity": 1, "size": "40", "color": "black",
                       "customizations": {"upper": "leather"}, "special_notes": null}],
            "notes": null,
            "expected_delivery": "2026-11-01"
        }"#;
        let order: NewOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.discount_amount, Money::zero());
        assert_eq!(
            order.items[0].customizations.as_ref().unwrap()["upper"],
            "leather"
        );
        assert_eq!(
            order.expected_delivery,
            NaiveDate::from_ymd_opt(2026, 11, 1)
        );
    }

    #[test]
    fn test_product_offers() {
        let now = Utc::now();
        let mut options = CustomizationOptions::new();
        options.insert("sole".to_string(), vec!["rubber".to_string()]);
        let product = Product {
            id: 1,
            category_id: 1,
            name: "Custom Canvas Sneakers".to_string(),
            description: None,
            base_price: Money::from_major(250_000),
            available_sizes: vec!["40".to_string(), "41".to_string()],
            available_colors: vec!["black".to_string()],
            customization_options: Some(options),
            image_url: None,
            is_customizable: true,
            active: true,
            created_at: now,
            updated_at: now,
        };

        assert!(product.offers_size("41"));
        assert!(!product.offers_size("45"));
        assert!(product.offers_color("black"));
    }
}
