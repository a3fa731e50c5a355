//! Renders listing predicates into parameterized SQL.
//!
//! ```text
//! [Search{[CustomerName, CustomerEmail], "ana"}, Eq{CustomerStatus, "active"}]
//!     ──► " WHERE (c.name LIKE ? ESCAPE '\' OR c.email LIKE ? ESCAPE '\') AND c.status = ?"
//!         bindings: ["%ana%", "%ana%", "active"]
//! ```
//!
//! Column expressions assume the listing aliases: `o` orders, `c` customers,
//! `p` products.

use shoehub_core::filter::{Field, FilterValue, Predicate};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;

#[derive(Debug, Clone, PartialEq)]
enum Binding {
    Text(String),
    Integer(i64),
}

/// A WHERE clause plus its bound values, in placeholder order.
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    bindings: Vec<Binding>,
}

fn column(field: Field) -> &'static str {
    match field {
        Field::OrderNumber => "o.order_number",
        Field::OrderStatus => "o.status",
        Field::PaymentStatus => "o.payment_status",
        Field::CustomerName => "c.name",
        Field::CustomerEmail => "c.email",
        Field::CustomerPhone => "c.phone",
        Field::CustomerStatus => "c.status",
        Field::ProductName => "p.name",
        Field::ProductDescription => "p.description",
        Field::CategoryId => "p.category_id",
        Field::IsCustomizable => "p.is_customizable",
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl WhereClause {
    pub fn from_predicates(predicates: &[Predicate]) -> Self {
        let mut clause = WhereClause::default();
        for predicate in predicates {
            match predicate {
                Predicate::Search { fields, term } => {
                    let pattern = like_pattern(term);
                    let parts: Vec<String> = fields
                        .iter()
                        .map(|f| format!("{} LIKE ? ESCAPE '\\'", column(*f)))
                        .collect();
                    clause.conditions.push(format!("({})", parts.join(" OR ")));
                    for _ in fields {
                        clause.bindings.push(Binding::Text(pattern.clone()));
                    }
                }
                Predicate::Eq { field, value } => {
                    clause.conditions.push(format!("{} = ?", column(*field)));
                    clause.bindings.push(match value {
                        FilterValue::Text(s) => Binding::Text(s.clone()),
                        FilterValue::Int(i) => Binding::Integer(*i),
                        FilterValue::Bool(b) => Binding::Integer(i64::from(*b)),
                    });
                }
            }
        }
        clause
    }

    /// `" WHERE ..."`, or empty when there are no conditions.
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn bind_as<'q, O>(
        &self,
        mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
        for binding in &self.bindings {
            query = match binding {
                Binding::Text(s) => query.bind(s.clone()),
                Binding::Integer(i) => query.bind(*i),
            };
        }
        query
    }

    pub fn bind_scalar<'q, O>(
        &self,
        mut query: QueryScalar<'q, Sqlite, O, SqliteArguments<'q>>,
    ) -> QueryScalar<'q, Sqlite, O, SqliteArguments<'q>> {
        for binding in &self.bindings {
            query = match binding {
                Binding::Text(s) => query.bind(s.clone()),
                Binding::Integer(i) => query.bind(*i),
            };
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoehub_core::filter::{CustomerQuery, OrderQuery, ProductQuery};
    use shoehub_core::{CustomerStatus, OrderStatus};

    #[test]
    fn test_empty_where_clause() {
        let clause = WhereClause::from_predicates(&OrderQuery::new().predicates());
        assert_eq!(clause.sql(), "");
        assert!(clause.bindings.is_empty());
    }

    #[test]
    fn test_search_and_status() {
        let query = CustomerQuery::new()
            .search("ana")
            .status(CustomerStatus::Active);
        let clause = WhereClause::from_predicates(&query.predicates());

        assert_eq!(
            clause.sql(),
            " WHERE (c.name LIKE ? ESCAPE '\\' OR c.email LIKE ? ESCAPE '\\' OR c.phone LIKE ? ESCAPE '\\') AND c.status = ?"
        );
        assert_eq!(clause.bindings.len(), 4);
        assert_eq!(clause.bindings[0], Binding::Text("%ana%".to_string()));
        assert_eq!(clause.bindings[3], Binding::Text("active".to_string()));
    }

    #[test]
    fn test_order_status_binding() {
        let clause =
            WhereClause::from_predicates(&OrderQuery::new().status(OrderStatus::Shipped).predicates());
        assert_eq!(clause.sql(), " WHERE o.status = ?");
        assert_eq!(clause.bindings, vec![Binding::Text("shipped".to_string())]);
    }

    #[test]
    fn test_bool_binds_as_integer() {
        let clause =
            WhereClause::from_predicates(&ProductQuery::new().customizable(true).predicates());
        assert_eq!(clause.bindings, vec![Binding::Integer(1)]);
    }

    #[test]
    fn test_wildcards_are_escaped() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
