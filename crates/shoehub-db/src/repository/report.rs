//! # Report Repository
//!
//! Read-only aggregates over sales, orders and the catalog.
//!
//! ## Data Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report                 Source rows                 Window              │
//! │  ────────────────────   ─────────────────────────   ─────────────────   │
//! │  monthly_sales_series   sales                       calendar year       │
//! │  sales_summary          sales by payment_method     [start, end] days   │
//! │  daily_sales            sales by date(payment_date) [start, end] days   │
//! │  top_customers          sales ⋈ orders ⋈ customers  [start, end] days   │
//! │  top_products           sales ⋈ order_items         [start, end] days   │
//! │  best_sellers           order_items (all orders)    none                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! SQL does the grouping; gap filling and ranking happen in
//! `shoehub_core::report` so the rules are testable without a database.

use chrono::{Datelike, NaiveDate};
use shoehub_core::report::{
    fill_daily_series, fill_monthly_series, rank_top, summarize_sales, Dashboard, DailySales,
    FinancialReport, MethodTotal, ReportWindow, SalesSummary, TopCustomer, TopProduct,
    DASHBOARD_LIMIT, REPORT_TOP_LIMIT,
};
use shoehub_core::{Clock, Money, PaymentMethod};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

use super::order::recent_summaries;
use crate::error::{DbError, DbResult};

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(0)
}

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        ReportRepository { pool, clock }
    }

    /// Sales per month of `year`, January first, zero-filled.
    pub async fn monthly_sales_series(&self, year: i32) -> DbResult<[Money; 12]> {
        let rows: Vec<(i64, Money)> = sqlx::query_as(
            r#"
            SELECT CAST(strftime('%m', payment_date) AS INTEGER) AS month,
                   COALESCE(SUM(amount), 0) AS total
            FROM sales
            WHERE strftime('%Y', payment_date) = ?1
            GROUP BY month
            "#,
        )
        .bind(format!("{:04}", year))
        .fetch_all(&self.pool)
        .await?;

        let rows: Vec<(u32, Money)> = rows
            .into_iter()
            .filter_map(|(month, total)| u32::try_from(month).ok().map(|m| (m, total)))
            .collect();

        debug!(year, months = rows.len(), "Monthly sales series");
        Ok(fill_monthly_series(&rows))
    }

    /// Revenue, transaction count, average and per-method breakdown.
    pub async fn sales_summary(&self, window: &ReportWindow) -> DbResult<SalesSummary> {
        let rows: Vec<(PaymentMethod, Money, i64)> = sqlx::query_as(
            r#"
            SELECT payment_method, COALESCE(SUM(amount), 0), COUNT(*)
            FROM sales
            WHERE date(payment_date) BETWEEN ?1 AND ?2
            GROUP BY payment_method
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let rows: Vec<MethodTotal> = rows
            .into_iter()
            .map(|(payment_method, total, transactions)| MethodTotal {
                payment_method,
                total,
                transactions,
            })
            .collect();

        Ok(summarize_sales(&rows))
    }

    /// One entry per day of the window.
    pub async fn daily_sales(&self, window: &ReportWindow) -> DbResult<Vec<DailySales>> {
        let rows: Vec<(String, Money, i64)> = sqlx::query_as(
            r#"
            SELECT date(payment_date) AS day, COALESCE(SUM(amount), 0), COUNT(*)
            FROM sales
            WHERE date(payment_date) BETWEEN ?1 AND ?2
            GROUP BY day
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let rows = rows
            .into_iter()
            .map(|(day, total, transactions)| {
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                    .map_err(|e| DbError::Internal(format!("bad sale date '{}': {}", day, e)))?;
                Ok(DailySales {
                    date,
                    total,
                    transactions,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(fill_daily_series(window, &rows))
    }

    /// Customers by amount paid within the window.
    pub async fn top_customers(
        &self,
        window: &ReportWindow,
        limit: i64,
    ) -> DbResult<Vec<TopCustomer>> {
        let rows: Vec<(i64, String, String, i64, Money)> = sqlx::query_as(
            r#"
            SELECT c.id, c.name, c.email, COUNT(s.id), COALESCE(SUM(s.amount), 0)
            FROM sales s
            JOIN orders o ON o.id = s.order_id
            JOIN customers c ON c.id = o.customer_id
            WHERE date(s.payment_date) BETWEEN ?1 AND ?2
            GROUP BY c.id, c.name, c.email
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        let customers = rows
            .into_iter()
            .map(|(customer_id, name, email, order_count, total_spent)| TopCustomer {
                customer_id,
                name,
                email,
                order_count,
                total_spent,
            })
            .collect();

        Ok(rank_top(
            customers,
            |c| c.total_spent,
            |c| c.customer_id,
            clamp_limit(limit),
        ))
    }

    /// Products by revenue from orders paid within the window.
    pub async fn top_products(
        &self,
        window: &ReportWindow,
        limit: i64,
    ) -> DbResult<Vec<TopProduct>> {
        let rows: Vec<(i64, String, i64, Money)> = sqlx::query_as(
            r#"
            SELECT p.id, p.name, COALESCE(SUM(oi.quantity), 0), COALESCE(SUM(oi.total_price), 0)
            FROM order_items oi
            JOIN sales s ON s.order_id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE date(s.payment_date) BETWEEN ?1 AND ?2
            GROUP BY p.id, p.name
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rank_top(
            rows.into_iter().map(top_product).collect(),
            |p| p.revenue,
            |p| p.product_id,
            clamp_limit(limit),
        ))
    }

    /// Products by units ordered, across every order.
    pub async fn best_sellers(&self, limit: i64) -> DbResult<Vec<TopProduct>> {
        let rows: Vec<(i64, String, i64, Money)> = sqlx::query_as(
            r#"
            SELECT p.id, p.name, COALESCE(SUM(oi.quantity), 0), COALESCE(SUM(oi.total_price), 0)
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            GROUP BY p.id, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rank_top(
            rows.into_iter().map(top_product).collect(),
            |p| p.units_sold,
            |p| p.product_id,
            clamp_limit(limit),
        ))
    }

    /// Overview numbers as of `today`.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<Dashboard> {
        let total_customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        let active_products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE active = 1")
                .fetch_one(&self.pool)
                .await?;
        let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        let month = self
            .sales_summary(&ReportWindow::current_month(today))
            .await?;

        Ok(Dashboard {
            total_customers,
            active_products,
            total_orders,
            monthly_revenue: month.total_revenue,
            recent_orders: recent_summaries(&self.pool, DASHBOARD_LIMIT).await?,
            monthly_sales: self.monthly_sales_series(today.year()).await?.to_vec(),
            top_products: self.best_sellers(DASHBOARD_LIMIT).await?,
        })
    }

    /// Summary, daily series and rankings for a window; the current month
    /// when `window` is `None`.
    pub async fn financial_report(&self, window: Option<ReportWindow>) -> DbResult<FinancialReport> {
        let window = window.unwrap_or_else(|| ReportWindow::current_month(self.clock.today()));

        debug!(start = %window.start, end = %window.end, "Building financial report");

        Ok(FinancialReport {
            summary: self.sales_summary(&window).await?,
            daily_sales: self.daily_sales(&window).await?,
            top_customers: self.top_customers(&window, REPORT_TOP_LIMIT).await?,
            product_performance: self.top_products(&window, REPORT_TOP_LIMIT).await?,
            window,
        })
    }
}

fn top_product((product_id, name, units_sold, revenue): (i64, String, i64, Money)) -> TopProduct {
    TopProduct {
        product_id,
        name,
        units_sold,
        revenue,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
