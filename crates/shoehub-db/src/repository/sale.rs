//! # Sale Repository
//!
//! Payments against orders. An order has at most one sale; recording a
//! second one is a conflict. Recording a sale leaves the order's
//! `payment_status` alone, callers update it explicitly.

use chrono::Utc;
use shoehub_core::validation::validate_sale;
use shoehub_core::{NewSale, Sale};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

const COLUMNS: &str = "id, order_id, amount, payment_method, payment_date, payment_notes, created_at";

/// The sale of an order, if any, through any executor.
pub(crate) async fn fetch_sale_for_order<'e, E>(executor: E, order_id: i64) -> DbResult<Option<Sale>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM sales WHERE order_id = ?1", COLUMNS);
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
    Ok(sale)
}

fn already_paid(order_id: i64) -> DbError {
    DbError::Conflict(format!("order {} already has a sale", order_id))
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records the payment of an order.
    ///
    /// ## Errors
    /// - amount not positive, notes too long → `Validation`
    /// - unknown order → `NotFound`
    /// - the order already has a sale → `Conflict`
    pub async fn record(&self, input: &NewSale) -> DbResult<Sale> {
        validate_sale(input)?;

        debug!(order_id = input.order_id, amount = %input.amount, "Recording sale");

        let mut tx = self.pool.begin().await?;

        let order: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = ?1")
            .bind(input.order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order.is_none() {
            return Err(DbError::not_found("Order", input.order_id));
        }

        if fetch_sale_for_order(&mut *tx, input.order_id).await?.is_some() {
            return Err(already_paid(input.order_id));
        }

        let sql = format!(
            r#"
            INSERT INTO sales (
                order_id, amount, payment_method, payment_date, payment_notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {}
            "#,
            COLUMNS
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(input.order_id)
            .bind(input.amount)
            .bind(input.payment_method)
            .bind(input.payment_date)
            .bind(&input.payment_notes)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { .. } => already_paid(input.order_id),
                other => other,
            })?;

        tx.commit().await?;

        info!(
            id = sale.id,
            order_id = sale.order_id,
            amount = %sale.amount,
            method = %sale.payment_method,
            "Sale recorded"
        );
        Ok(sale)
    }

    pub async fn get(&self, id: i64) -> DbResult<Sale> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?1", COLUMNS);
        sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))
    }

    pub async fn for_order(&self, order_id: i64) -> DbResult<Option<Sale>> {
        fetch_sale_for_order(&self.pool, order_id).await
    }
}
