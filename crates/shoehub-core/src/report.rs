//! # Report Shaping
//!
//! Pure post-processing for the reporting queries: gap-filling time series,
//! summarizing grouped sales, and ranking.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SQLite (shoehub-db)                 this module                        │
//! │                                                                         │
//! │  GROUP BY month ──► [(3, 100), (11, 50)] ──► fill_monthly_series        │
//! │                                              [0,0,100,0,…,0,50,0]       │
//! │                                                                         │
//! │  GROUP BY day   ──► sparse DailySales   ──► fill_daily_series           │
//! │                                              one row per day in window  │
//! │                                                                         │
//! │  GROUP BY method ─► MethodTotal rows    ──► summarize_sales             │
//! │                                              totals + guarded average   │
//! │                                                                         │
//! │  GROUP BY customer/product ───────────────► rank_top (stable, id tie)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{OrderSummary, PaymentMethod};

/// Rows shown in the financial report's customer and product rankings.
pub const REPORT_TOP_LIMIT: i64 = 10;

/// Rows shown in the dashboard's recent orders and best sellers.
pub const DASHBOARD_LIMIT: i64 = 5;

// =============================================================================
// Report Window
// =============================================================================

/// An inclusive range of whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReportWindow {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Builds a window; `start` after `end` is rejected.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::NotAfter {
                field: "end_date".to_string(),
                reference: start.to_string(),
            });
        }
        Ok(ReportWindow { start, end })
    }

    /// First through last day of the month containing `today`.
    pub fn current_month(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(today);
        ReportWindow { start, end }
    }

    /// Every day of the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// =============================================================================
// Time Series
// =============================================================================

/// Spreads `(month, total)` rows over January..December, zero where absent.
///
/// Months outside 1..=12 are ignored; repeated months are added together.
///
/// ```rust
/// use shoehub_core::money::Money;
/// use shoehub_core::report::fill_monthly_series;
///
/// let series = fill_monthly_series(&[(3, Money::from_major(100)), (11, Money::from_major(50))]);
/// assert_eq!(series[2], Money::from_major(100));
/// assert_eq!(series[10], Money::from_major(50));
/// assert_eq!(series.iter().filter(|m| m.is_zero()).count(), 10);
/// ```
pub fn fill_monthly_series(rows: &[(u32, Money)]) -> [Money; 12] {
    let mut series = [Money::zero(); 12];
    for (month, total) in rows {
        if (1..=12).contains(month) {
            series[(*month - 1) as usize] += *total;
        }
    }
    series
}

/// Revenue and sale count for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total: Money,
    pub transactions: i64,
}

/// One row per day of `window`, zero-filled where `rows` has no entry.
/// Rows outside the window are dropped.
pub fn fill_daily_series(window: &ReportWindow, rows: &[DailySales]) -> Vec<DailySales> {
    let by_day: HashMap<NaiveDate, &DailySales> = rows.iter().map(|r| (r.date, r)).collect();
    window
        .days()
        .map(|date| match by_day.get(&date) {
            Some(row) => **row,
            None => DailySales {
                date,
                total: Money::zero(),
                transactions: 0,
            },
        })
        .collect()
}

// =============================================================================
// Sales Summary
// =============================================================================

/// Sales grouped by payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MethodTotal {
    pub payment_method: PaymentMethod,
    pub total: Money,
    pub transactions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub total_revenue: Money,
    pub total_transactions: i64,
    /// Zero when there are no transactions.
    pub average_transaction: Money,
    /// Only methods that occur, in `PaymentMethod::ALL` order.
    pub by_method: Vec<MethodTotal>,
}

/// Folds per-method rows into a summary.
pub fn summarize_sales(rows: &[MethodTotal]) -> SalesSummary {
    let by_method: Vec<MethodTotal> = PaymentMethod::ALL
        .iter()
        .filter_map(|method| {
            let matching = rows.iter().filter(|r| r.payment_method == *method);
            let (total, transactions) = matching.fold((Money::zero(), 0), |(t, n), r| {
                (t + r.total, n + r.transactions)
            });
            (transactions > 0).then_some(MethodTotal {
                payment_method: *method,
                total,
                transactions,
            })
        })
        .collect();

    let total_revenue: Money = by_method.iter().map(|m| m.total).sum();
    let total_transactions: i64 = by_method.iter().map(|m| m.transactions).sum();

    SalesSummary {
        total_revenue,
        total_transactions,
        average_transaction: total_revenue.div_round(total_transactions),
        by_method,
    }
}

// =============================================================================
// Rankings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopCustomer {
    pub customer_id: i64,
    pub name: String,
    pub email: String,
    pub order_count: i64,
    pub total_spent: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: i64,
    pub name: String,
    pub units_sold: i64,
    pub revenue: Money,
}

/// Sorts descending by `key`, ties by ascending `id`, and keeps `limit` rows.
///
/// ```rust
/// use shoehub_core::report::rank_top;
///
/// let rows = vec![(3, 10), (1, 10), (2, 30)];
/// let top = rank_top(rows, |r| r.1, |r| r.0, 2);
/// assert_eq!(top, vec![(2, 30), (1, 10)]);
/// ```
pub fn rank_top<T, K: Ord>(
    mut rows: Vec<T>,
    key: impl Fn(&T) -> K,
    id: impl Fn(&T) -> i64,
    limit: usize,
) -> Vec<T> {
    rows.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| id(a).cmp(&id(b))));
    rows.truncate(limit);
    rows
}

// =============================================================================
// Dashboard / Financial Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    pub total_customers: i64,
    pub active_products: i64,
    pub total_orders: i64,
    /// Sales recorded in the current calendar month.
    pub monthly_revenue: Money,
    pub recent_orders: Vec<OrderSummary>,
    /// Twelve entries, January first, for the current year.
    pub monthly_sales: Vec<Money>,
    /// Best sellers by units across all orders.
    pub top_products: Vec<TopProduct>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialReport {
    pub window: ReportWindow,
    pub summary: SalesSummary,
    pub daily_sales: Vec<DailySales>,
    pub top_customers: Vec<TopCustomer>,
    pub product_performance: Vec<TopProduct>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_series_gap_fill() {
        let series = fill_monthly_series(&[(3, Money::from_major(100)), (11, Money::from_major(50))]);
        let mut expected = [Money::zero(); 12];
        expected[2] = Money::from_major(100);
        expected[10] = Money::from_major(50);
        assert_eq!(series, expected);
    }

    #[test]
    fn test_monthly_series_ignores_bad_months() {
        let series = fill_monthly_series(&[(0, Money::from_major(1)), (13, Money::from_major(1))]);
        assert!(series.iter().all(|m| m.is_zero()));
    }

    #[test]
    fn test_current_month_window() {
        let w = ReportWindow::current_month(date(2026, 2, 14));
        assert_eq!(w.start, date(2026, 2, 1));
        assert_eq!(w.end, date(2026, 2, 28));

        let w = ReportWindow::current_month(date(2026, 12, 31));
        assert_eq!(w.start, date(2026, 12, 1));
        assert_eq!(w.end, date(2026, 12, 31));
    }

    #[test]
    fn test_window_rejects_reversed_range() {
        assert!(ReportWindow::new(date(2026, 3, 2), date(2026, 3, 1)).is_err());
        assert!(ReportWindow::new(date(2026, 3, 1), date(2026, 3, 1)).is_ok());
    }

    #[test]
    fn test_daily_fill() {
        let window = ReportWindow::new(date(2026, 3, 1), date(2026, 3, 4)).unwrap();
        let rows = [
            DailySales {
                date: date(2026, 3, 2),
                total: Money::from_major(80),
                transactions: 2,
            },
            DailySales {
                date: date(2026, 4, 1),
                total: Money::from_major(5),
                transactions: 1,
            },
        ];
        let filled = fill_daily_series(&window, &rows);
        assert_eq!(filled.len(), 4);
        assert_eq!(filled[0].total, Money::zero());
        assert_eq!(filled[1].transactions, 2);
        assert_eq!(filled[3].date, date(2026, 3, 4));
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize_sales(&[]);
        assert_eq!(summary.total_revenue, Money::zero());
        assert_eq!(summary.total_transactions, 0);
        assert_eq!(summary.average_transaction, Money::zero());
        assert!(summary.by_method.is_empty());
    }

    #[test]
    fn test_summary_orders_methods_and_averages() {
        let rows = [
            MethodTotal {
                payment_method: PaymentMethod::EWallet,
                total: Money::from_cents(100),
                transactions: 1,
            },
            MethodTotal {
                payment_method: PaymentMethod::Cash,
                total: Money::from_cents(201),
                transactions: 2,
            },
        ];
        let summary = summarize_sales(&rows);
        assert_eq!(summary.total_revenue, Money::from_cents(301));
        assert_eq!(summary.total_transactions, 3);
        // 301 / 3 = 100.33.. → 100
        assert_eq!(summary.average_transaction, Money::from_cents(100));
        let methods: Vec<_> = summary.by_method.iter().map(|m| m.payment_method).collect();
        assert_eq!(methods, vec![PaymentMethod::Cash, PaymentMethod::EWallet]);
    }

    #[test]
    fn test_rank_top_ties_by_id() {
        let rows = vec![
            TopProduct {
                product_id: 9,
                name: "B".to_string(),
                units_sold: 4,
                revenue: Money::from_major(10),
            },
            TopProduct {
                product_id: 2,
                name: "A".to_string(),
                units_sold: 4,
                revenue: Money::from_major(10),
            },
            TopProduct {
                product_id: 5,
                name: "C".to_string(),
                units_sold: 1,
                revenue: Money::from_major(99),
            },
        ];
        let by_units = rank_top(rows.clone(), |p| p.units_sold, |p| p.product_id, 5);
        let ids: Vec<i64> = by_units.iter().map(|p| p.product_id).collect();
        assert_eq!(ids, vec![2, 9, 5]);

        let by_revenue = rank_top(rows, |p| p.revenue, |p| p.product_id, 1);
        assert_eq!(by_revenue[0].product_id, 5);
    }
}
