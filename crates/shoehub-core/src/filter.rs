//! # Listing Filters
//!
//! Composable filters and pagination for the order, customer and product
//! listings.
//!
//! ```text
//! OrderQuery::new().search("SH-2026").status(OrderStatus::Ready).page(2)
//!        │
//!        ▼ predicates()
//! [Search{[OrderNumber, CustomerName, CustomerEmail], "SH-2026"},
//!  Eq{OrderStatus, Text("ready")}]
//!        │
//!        ▼ shoehub-db renders with bound parameters
//! WHERE (o.order_number LIKE ? OR c.name LIKE ? OR c.email LIKE ?)
//!   AND o.status = ?
//! ```
//!
//! Queries only describe what to match; the database crate owns the SQL.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{CustomerStatus, OrderStatus, PaymentStatus};
use crate::MAX_PER_PAGE;

/// Default page size of order and customer listings.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Default page size of the product catalog.
pub const PRODUCTS_PER_PAGE: u32 = 12;

// =============================================================================
// Predicates
// =============================================================================

/// A filterable attribute of a listing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    OrderNumber,
    OrderStatus,
    PaymentStatus,
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    CustomerStatus,
    ProductName,
    ProductDescription,
    CategoryId,
    IsCustomizable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

/// One condition; a listing matches when all of its predicates hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Substring match on any of `fields`.
    Search { fields: Vec<Field>, term: String },
    /// Exact match.
    Eq { field: Field, value: FilterValue },
}

/// Trims a search term; blank terms mean "no search".
fn search_term(term: Option<&String>) -> Option<String> {
    term.map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Pagination
// =============================================================================

/// A 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Builds a page request, clamping `page ≥ 1` and `1 ≤ per_page ≤ MAX_PER_PAGE`.
    pub fn new(page: u32, per_page: u32) -> Self {
        Page {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(1, DEFAULT_PER_PAGE)
    }
}

/// One page of a listing plus the numbers a paginator needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    /// At least 1, even for an empty listing.
    pub last_page: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, page: Page) -> Self {
        let per_page = i64::from(page.per_page);
        let pages = (total.max(0) + per_page - 1) / per_page;
        Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
            last_page: u32::try_from(pages.max(1)).unwrap_or(u32::MAX),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            last_page: self.last_page,
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Order listing: search by order number or customer name/email.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderQuery {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub page: Page,
}

impl OrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = Some(status);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Page::new(page, self.page.per_page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.page = Page::new(self.page.page, per_page);
        self
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(term) = search_term(self.search.as_ref()) {
            out.push(Predicate::Search {
                fields: vec![Field::OrderNumber, Field::CustomerName, Field::CustomerEmail],
                term,
            });
        }
        if let Some(status) = self.status {
            out.push(Predicate::Eq {
                field: Field::OrderStatus,
                value: FilterValue::Text(status.as_str().to_string()),
            });
        }
        if let Some(status) = self.payment_status {
            out.push(Predicate::Eq {
                field: Field::PaymentStatus,
                value: FilterValue::Text(status.as_str().to_string()),
            });
        }
        out
    }
}

/// Customer listing: search by name, email or phone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
    pub status: Option<CustomerStatus>,
    #[serde(default)]
    pub page: Page,
}

impl CustomerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: CustomerStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Page::new(page, self.page.per_page);
        self
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(term) = search_term(self.search.as_ref()) {
            out.push(Predicate::Search {
                fields: vec![Field::CustomerName, Field::CustomerEmail, Field::CustomerPhone],
                term,
            });
        }
        if let Some(status) = self.status {
            out.push(Predicate::Eq {
                field: Field::CustomerStatus,
                value: FilterValue::Text(status.as_str().to_string()),
            });
        }
        out
    }
}

/// Product catalog: search by name or description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub customizable: Option<bool>,
    #[serde(default = "product_page")]
    pub page: Page,
}

fn product_page() -> Page {
    Page::new(1, PRODUCTS_PER_PAGE)
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            search: None,
            category_id: None,
            customizable: None,
            page: product_page(),
        }
    }
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn customizable(mut self, customizable: bool) -> Self {
        self.customizable = Some(customizable);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Page::new(page, self.page.per_page);
        self
    }

    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(term) = search_term(self.search.as_ref()) {
            out.push(Predicate::Search {
                fields: vec![Field::ProductName, Field::ProductDescription],
                term,
            });
        }
        if let Some(id) = self.category_id {
            out.push(Predicate::Eq {
                field: Field::CategoryId,
                value: FilterValue::Int(id),
            });
        }
        if let Some(flag) = self.customizable {
            out.push(Predicate::Eq {
                field: Field::IsCustomizable,
                value: FilterValue::Bool(flag),
            });
        }
        out
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamping() {
        let p = Page::new(0, 0);
        assert_eq!((p.page, p.per_page), (1, 1));

        let p = Page::new(3, 500);
        assert_eq!(p.per_page, MAX_PER_PAGE);
        assert_eq!(p.offset(), 2 * i64::from(MAX_PER_PAGE));
    }

    #[test]
    fn test_last_page() {
        let page = Page::new(1, 10);
        assert_eq!(Paginated::<i32>::new(vec![], 0, page).last_page, 1);
        assert_eq!(Paginated::<i32>::new(vec![], 10, page).last_page, 1);
        assert_eq!(Paginated::<i32>::new(vec![], 11, page).last_page, 2);
        assert_eq!(Paginated::<i32>::new(vec![], 95, page).last_page, 10);
    }

    #[test]
    fn test_empty_query_has_no_predicates() {
        assert!(OrderQuery::new().predicates().is_empty());
        assert!(OrderQuery::new().search("   ").predicates().is_empty());
        assert_eq!(OrderQuery::new().page, Page::new(1, DEFAULT_PER_PAGE));
        assert_eq!(ProductQuery::new().page.per_page, PRODUCTS_PER_PAGE);
    }

    #[test]
    fn test_order_query_predicates_in_order() {
        let preds = OrderQuery::new()
            .payment_status(PaymentStatus::Paid)
            .search(" ana ")
            .status(OrderStatus::Ready)
            .predicates();

        assert_eq!(preds.len(), 3);
        assert_eq!(
            preds[0],
            Predicate::Search {
                fields: vec![Field::OrderNumber, Field::CustomerName, Field::CustomerEmail],
                term: "ana".to_string(),
            }
        );
        assert_eq!(
            preds[1],
            Predicate::Eq {
                field: Field::OrderStatus,
                value: FilterValue::Text("ready".to_string()),
            }
        );
        assert_eq!(
            preds[2],
            Predicate::Eq {
                field: Field::PaymentStatus,
                value: FilterValue::Text("paid".to_string()),
            }
        );
    }

    #[test]
    fn test_product_query_predicates() {
        let preds = ProductQuery::new().category(4).customizable(true).predicates();
        assert_eq!(
            preds,
            vec![
                Predicate::Eq {
                    field: Field::CategoryId,
                    value: FilterValue::Int(4),
                },
                Predicate::Eq {
                    field: Field::IsCustomizable,
                    value: FilterValue::Bool(true),
                },
            ]
        );
    }

    #[test]
    fn test_page_builder_keeps_per_page() {
        let q = ProductQuery::new().page(3);
        assert_eq!(q.page, Page::new(3, PRODUCTS_PER_PAGE));
    }
}
