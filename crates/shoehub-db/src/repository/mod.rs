//! # Repository Module
//!
//! Database repository implementations for ShoeHub.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.orders().create(&new_order)                                │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── validates + prices through shoehub-core                           │
//! │  ├── allocates the order number                                        │
//! │  └── writes header + items in one transaction                          │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers, cascade deletes
//! - [`CategoryRepository`](category::CategoryRepository) - Shoe categories
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and search
//! - [`OrderRepository`](order::OrderRepository) - Order creation, updates, listings
//! - [`SaleRepository`](sale::SaleRepository) - Payments
//! - [`ReportRepository`](report::ReportRepository) - Dashboard and financial reports

pub mod category;
pub mod customer;
pub mod order;
pub mod product;
pub mod report;
pub mod sale;

#[cfg(test)]
pub(crate) mod fixtures;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::DbResult;

/// How to treat dependent rows when deleting a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Refuse while dependents exist.
    #[default]
    Restrict,
    /// Delete dependents too.
    Cascade,
}

/// Rows removed along with a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CascadeReport {
    pub orders: i64,
    pub items: i64,
    pub sales: i64,
}

/// Encodes a JSON column.
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> DbResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a JSON column.
pub(crate) fn from_json<T: DeserializeOwned>(text: &str) -> DbResult<T> {
    Ok(serde_json::from_str(text)?)
}
