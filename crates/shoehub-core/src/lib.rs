//! # shoehub-core: Pure Business Logic for ShoeHub
//!
//! Order management for a custom-shoe workshop. This crate holds every
//! business rule as pure code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShoeHub Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Presentation (forms, dashboard, reports)               │   │
//! │  │      consumes the serde / ts-rs types defined here              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shoehub-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────────┐ ┌─────────────┐    │   │
//! │  │   │  money  │ │ pricing │ │ order_number │ │    order    │    │   │
//! │  │   │  Money  │ │ 11% tax │ │ SH-YYYY-NNNN │ │ draft/status│    │   │
//! │  │   └─────────┘ └─────────┘ └──────────────┘ └─────────────┘    │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────────┐ ┌─────────────┐    │   │
//! │  │   │  types  │ │ filter  │ │    report    │ │ validation  │    │   │
//! │  │   └─────────┘ └─────────┘ └──────────────┘ └─────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                shoehub-db (Database Layer)                      │   │
//! │  │      SQLite, migrations, repositories, reporting queries        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact fixed-point amounts (hundredths)
//! - [`pricing`] - Subtotal, tax and discount rules
//! - [`order_number`] - Year-scoped order identifiers
//! - [`order`] - Order drafts and status update rules
//! - [`clock`] - Injectable source of "now"
//! - [`types`] - Domain entities and request shapes
//! - [`validation`] - Field-level input checks
//! - [`filter`] - Listing filters and pagination
//! - [`report`] - Report shaping (gap-fill, summaries, rankings)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shoehub_core::money::Money;
//! use shoehub_core::pricing::TAX_RATE;
//!
//! let subtotal: Money = "250000.00".parse().unwrap();
//! let tax = subtotal.calculate_tax(TAX_RATE);
//! assert_eq!(tax.to_string(), "27500.00");
//! assert_eq!((subtotal + tax).to_string(), "277500.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod filter;
pub mod money;
pub mod order;
pub mod order_number;
pub mod pricing;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{OrderDraft, StatusPolicy};
pub use order_number::OrderNumber;
pub use pricing::{DiscountPolicy, OrderTotals, TAX_RATE};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single order item.
///
/// Catches typing 1000 instead of 10 on the order form.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of names, emails and URLs.
pub const MAX_NAME_LENGTH: usize = 255;

/// Upper bound for a listing's page size.
pub const MAX_PER_PAGE: u32 = 100;
