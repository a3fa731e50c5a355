//! # Customer Repository
//!
//! Customers own their orders. Deleting a customer therefore needs an
//! explicit [`DeleteMode`]:
//!
//! ```text
//! delete(id, Restrict) ── has orders? ──► DbError::Integrity
//!                      └─ no orders   ──► deleted
//!
//! delete(id, Cascade)  ──► count orders / items / sales
//!                      ──► DELETE customer (FK cascade removes the rest)
//!                      ──► CascadeReport, logged at WARN
//! ```

use chrono::Utc;
use shoehub_core::filter::{CustomerQuery, Paginated};
use shoehub_core::validation::validate_customer;
use shoehub_core::{Customer, NewCustomer, ValidationError};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::{CascadeReport, DeleteMode};
use crate::error::{DbError, DbResult};
use crate::query::WhereClause;

const COLUMNS: &str = "c.id, c.name, c.email, c.phone, c.address, c.city, c.postal_code, \
                       c.status, c.created_at, c.updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

/// Maps a duplicate email to a field-level validation error.
fn email_taken(err: DbError, email: &str) -> DbError {
    match err {
        DbError::UniqueViolation { ref field, .. } if field.ends_with("email") => {
            DbError::Validation(ValidationError::Duplicate {
                field: "email".to_string(),
                value: email.to_string(),
            })
        }
        other => other,
    }
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        validate_customer(input)?;
        let now = Utc::now();
        let email = input.email.trim();

        debug!(email = %email, "Creating customer");

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                name, email, phone, address, city, postal_code, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            RETURNING id, name, email, phone, address, city, postal_code,
                      status, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(input.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| email_taken(e.into(), email))?;

        info!(id = customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update(&self, id: i64, input: &NewCustomer) -> DbResult<Customer> {
        validate_customer(input)?;
        let email = input.email.trim();

        debug!(id, "Updating customer");

        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = ?2, email = ?3, phone = ?4, address = ?5, city = ?6,
                postal_code = ?7, status = ?8, updated_at = ?9
            WHERE id = ?1
            RETURNING id, name, email, phone, address, city, postal_code,
                      status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(input.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| email_taken(e.into(), email))?
        .ok_or_else(|| DbError::not_found("Customer", id))
    }

    pub async fn find(&self, id: i64) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {} FROM customers c WHERE c.id = ?1", COLUMNS);
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    /// Gets a customer, failing with `NotFound` when missing.
    pub async fn get(&self, id: i64) -> DbResult<Customer> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Lists customers, newest first.
    pub async fn list(&self, query: &CustomerQuery) -> DbResult<Paginated<Customer>> {
        let clause = WhereClause::from_predicates(&query.predicates());
        let page = query.page;

        let count_sql = format!("SELECT COUNT(*) FROM customers c{}", clause.sql());
        let total: i64 = clause
            .bind_scalar(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "SELECT {} FROM customers c{} ORDER BY c.created_at DESC, c.id DESC LIMIT ? OFFSET ?",
            COLUMNS,
            clause.sql()
        );
        let items = clause
            .bind_as(sqlx::query_as::<_, Customer>(&list_sql))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        debug!(total, returned = items.len(), "Listed customers");
        Ok(Paginated::new(items, total, page))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a customer.
    ///
    /// ## Errors
    /// - missing customer → `NotFound`
    /// - `Restrict` while the customer has orders → `Integrity`
    pub async fn delete(&self, id: i64, mode: DeleteMode) -> DbResult<CascadeReport> {
        let mut tx = self.pool.begin().await?;

        let report: CascadeReport = {
            let orders: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = ?1")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            let items: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM order_items oi JOIN orders o ON o.id = oi.order_id \
                 WHERE o.customer_id = ?1",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            let sales: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sales s JOIN orders o ON o.id = s.order_id \
                 WHERE o.customer_id = ?1",
            )
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            CascadeReport {
                orders,
                items,
                sales,
            }
        };

        if mode == DeleteMode::Restrict && report.orders > 0 {
            return Err(DbError::Integrity(format!(
                "customer {} has {} order(s); delete with cascade to remove them",
                id, report.orders
            )));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        tx.commit().await?;

        if report.orders > 0 {
            warn!(
                customer_id = id,
                orders = report.orders,
                items = report.items,
                sales = report.sales,
                "Customer deleted with cascade"
            );
        } else {
            info!(customer_id = id, "Customer deleted");
        }

        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
