//! # Order Repository
//!
//! Creation, updates, listings and deletion of orders.
//!
//! ## Order Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      create(&NewOrder)                                  │
//! │                                                                         │
//! │  validate_new_order (pure, before any I/O)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  retry_with_backoff ─────────────────────────────────────┐              │
//! │  │ BEGIN                                                 │              │
//! │  │ 1. INSERT .. ON CONFLICT(year) DO UPDATE .. RETURNING │ Conflict?    │
//! │  │    (first write: takes the write lock)                │ (locked /    │
//! │  │ 2. customer exists?            ──► NotFound           │  duplicate   │
//! │  │ 3. products exist?             ──► NotFound           │  number)     │
//! │  │ 4. OrderDraft::build (sizes, colors, customizations,  │   │          │
//! │  │    price snapshot, totals)     ──► Validation         │   ▼          │
//! │  │ 5. INSERT orders, INSERT order_items                  │ back off,    │
//! │  │ COMMIT                                                │ run again    │
//! │  └───────────────────────────────────────────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any failure rolls the whole transaction back, including the sequence
//! increment, so failed orders never consume a number.

use chrono::{DateTime, Datelike, Utc};
use shoehub_core::filter::{OrderQuery, Page, Paginated};
use shoehub_core::order::check_update;
use shoehub_core::order_number::MAX_ORDER_SEQUENCE;
use shoehub_core::validation::validate_new_order;
use shoehub_core::{
    Clock, CoreError, Customer, Customizations, Money, NewOrder, Order, OrderDetail, OrderDraft,
    OrderItem, OrderNumber, OrderSummary, OrderUpdate, Product,
};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::product::fetch_product;
use super::sale::fetch_sale_for_order;
use super::{from_json, to_json};
use crate::config::OrderPolicy;
use crate::error::{DbError, DbResult};
use crate::query::WhereClause;
use crate::retry::retry_with_backoff;

const COLUMNS: &str = "o.id, o.order_number, o.customer_id, o.subtotal, o.tax_amount, \
                       o.discount_amount, o.total_amount, o.status, o.payment_status, \
                       o.notes, o.expected_delivery, o.created_at, o.updated_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, unit_price, total_price, \
                            size, color, customizations, special_notes, created_at";

/// Advances the yearly sequence. The first allocation of a year starts
/// after the greatest `SH-<year>-` number already stored.
const ALLOCATE_SQL: &str = r#"
    INSERT INTO order_number_sequences (year, last_value)
    VALUES (
        ?1,
        COALESCE(
            (SELECT CAST(substr(order_number, 9) AS INTEGER)
             FROM orders
             WHERE order_number LIKE ?2
             ORDER BY order_number DESC
             LIMIT 1),
            0
        ) + 1
    )
    ON CONFLICT(year) DO UPDATE SET last_value = last_value + 1
    RETURNING last_value
"#;

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: Money,
    total_price: Money,
    size: String,
    color: String,
    customizations: Option<String>,
    special_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = DbError;

    fn try_from(row: OrderItemRow) -> DbResult<Self> {
        let customizations = row
            .customizations
            .as_deref()
            .map(from_json::<Customizations>)
            .transpose()?;

        Ok(OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_price: row.total_price,
            size: row.size,
            color: row.color,
            customizations,
            special_notes: row.special_notes,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    #[sqlx(flatten)]
    order: Order,
    customer_name: String,
    item_count: i64,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        OrderSummary {
            order: row.order,
            customer_name: row.customer_name,
            item_count: row.item_count,
        }
    }
}

fn summary_select() -> String {
    format!(
        "SELECT {}, c.name AS customer_name, \
         (SELECT COUNT(*) FROM order_items i WHERE i.order_id = o.id) AS item_count \
         FROM orders o JOIN customers c ON c.id = o.customer_id",
        COLUMNS
    )
}

/// The most recent orders with their customer names.
pub(crate) async fn recent_summaries(pool: &SqlitePool, limit: i64) -> DbResult<Vec<OrderSummary>> {
    let sql = format!(
        "{} ORDER BY o.created_at DESC, o.id DESC LIMIT ?1",
        summary_select()
    );
    let rows = sqlx::query_as::<_, OrderSummaryRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(OrderSummary::from).collect())
}

async fn fetch_order<'e, E>(executor: E, id: i64) -> DbResult<Option<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM orders o WHERE o.id = ?1", COLUMNS);
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

/// Takes the next number of `year` inside the caller's transaction.
async fn allocate_order_number(conn: &mut SqliteConnection, year: i32) -> DbResult<OrderNumber> {
    let pattern = format!("{}%", OrderNumber::year_prefix(year));
    let last_value: i64 = sqlx::query_scalar(ALLOCATE_SQL)
        .bind(year)
        .bind(pattern)
        .fetch_one(conn)
        .await?;

    let sequence = u32::try_from(last_value).map_err(|_| CoreError::OrderNumberExhausted {
        year,
        max: MAX_ORDER_SEQUENCE,
    })?;
    Ok(OrderNumber::new(year, sequence)?)
}

/// A duplicate order number means another writer won the race.
fn number_taken(err: sqlx::Error) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } if field.contains("order_number") => {
            DbError::Conflict(format!("order number already taken ({})", field))
        }
        other => other,
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    policy: OrderPolicy,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>, policy: OrderPolicy) -> Self {
        OrderRepository {
            pool,
            clock,
            policy,
        }
    }

    /// Creates an order with a fresh `SH-YYYY-NNNNNN` number.
    ///
    /// Status and payment status start as `pending`. Each item stores the
    /// product's current `base_price` as its unit price.
    ///
    /// ## Errors
    /// - malformed input, unknown size/color/customization, inactive
    ///   product, oversized discount → `Validation`
    /// - unknown customer or product → `NotFound`
    /// - sequence past 999999 → `Core(OrderNumberExhausted)`
    /// - still contended after every retry → `Conflict`
    pub async fn create(&self, input: &NewOrder) -> DbResult<Order> {
        let now = self.clock.now();
        validate_new_order(input, now.date_naive())?;

        debug!(
            customer_id = input.customer_id,
            items = input.items.len(),
            "Creating order"
        );

        let order = retry_with_backoff(self.policy.retry, "create_order", |_| {
            self.try_create(input, now)
        })
        .await?;

        info!(
            id = order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            "Order created"
        );
        Ok(order)
    }

    async fn try_create(&self, input: &NewOrder, now: DateTime<Utc>) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let number = allocate_order_number(&mut *tx, now.year()).await?;

        let customer: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
            .bind(input.customer_id)
            .fetch_optional(&mut *tx)
            .await?;
        if customer.is_none() {
            return Err(DbError::not_found("Customer", input.customer_id));
        }

        let mut products: HashMap<i64, Product> = HashMap::new();
        for item in &input.items {
            if products.contains_key(&item.product_id) {
                continue;
            }
            let product = fetch_product(&mut *tx, item.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", item.product_id))?;
            products.insert(product.id, product);
        }

        let draft = OrderDraft::build(input, &products, self.policy.discount, now.date_naive())?;

        let sql = format!(
            r#"
            INSERT INTO orders (
                order_number, customer_id, subtotal, tax_amount, discount_amount,
                total_amount, status, payment_status, notes, expected_delivery,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', 'pending', ?7, ?8, ?9, ?9)
            RETURNING {}
            "#,
            COLUMNS.replace("o.", "")
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(number.to_string())
            .bind(draft.customer_id)
            .bind(draft.totals.subtotal)
            .bind(draft.totals.tax_amount)
            .bind(draft.totals.discount_amount)
            .bind(draft.totals.total_amount)
            .bind(&draft.notes)
            .bind(draft.expected_delivery)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(number_taken)?;

        for item in &draft.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, product_id, quantity, unit_price, total_price,
                    size, color, customizations, special_notes, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .bind(&item.size)
            .bind(&item.color)
            .bind(item.customizations.as_ref().map(to_json).transpose()?)
            .bind(&item.special_notes)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order)
    }

    pub async fn find(&self, id: i64) -> DbResult<Option<Order>> {
        fetch_order(&self.pool, id).await
    }

    /// Gets an order, failing with `NotFound` when missing.
    pub async fn get(&self, id: i64) -> DbResult<Order> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    pub async fn find_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders o WHERE o.order_number = ?1", COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Line items of an order, in insertion order.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        );
        sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(OrderItem::try_from)
            .collect()
    }

    /// Order with its customer, items and payment.
    pub async fn detail(&self, id: i64) -> DbResult<OrderDetail> {
        let order = self.get(id).await?;

        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, email, phone, address, city, postal_code, status, \
             created_at, updated_at FROM customers WHERE id = ?1",
        )
        .bind(order.customer_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", order.customer_id))?;

        let items = self.items(id).await?;
        let sale = fetch_sale_for_order(&self.pool, id).await?;

        Ok(OrderDetail {
            order,
            customer,
            items,
            sale,
        })
    }

    /// Lists orders, newest first, with customer name and item count.
    pub async fn list(&self, query: &OrderQuery) -> DbResult<Paginated<OrderSummary>> {
        let clause = WhereClause::from_predicates(&query.predicates());
        let page: Page = query.page;

        let count_sql = format!(
            "SELECT COUNT(*) FROM orders o JOIN customers c ON c.id = o.customer_id{}",
            clause.sql()
        );
        let total: i64 = clause
            .bind_scalar(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "{}{} ORDER BY o.created_at DESC, o.id DESC LIMIT ? OFFSET ?",
            summary_select(),
            clause.sql()
        );
        let rows = clause
            .bind_as(sqlx::query_as::<_, OrderSummaryRow>(&list_sql))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        debug!(total, returned = rows.len(), "Listed orders");
        Ok(Paginated::new(
            rows.into_iter().map(OrderSummary::from).collect(),
            total,
            page,
        ))
    }

    /// All orders of one customer, newest first.
    pub async fn list_for_customer(&self, customer_id: i64) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders o WHERE o.customer_id = ?1 \
             ORDER BY o.created_at DESC, o.id DESC",
            COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    pub async fn recent(&self, limit: i64) -> DbResult<Vec<OrderSummary>> {
        recent_summaries(&self.pool, limit).await
    }

    /// Changes status and payment status, and notes and delivery date when
    /// given; a `None` leaves the stored value. Items and amounts are never
    /// touched.
    ///
    /// ## Errors
    /// - unknown order → `NotFound`
    /// - notes too long / delivery date not after the order's creation day
    ///   → `Validation`
    /// - strict status policy and a disallowed move → `Core(InvalidTransition)`
    pub async fn update(&self, id: i64, update: &OrderUpdate) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_order(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        check_update(&current, update, self.policy.status)?;

        let sql = format!(
            r#"
            UPDATE orders
            SET status = ?2, payment_status = ?3,
                notes = COALESCE(?4, notes),
                expected_delivery = COALESCE(?5, expected_delivery),
                updated_at = ?6
            WHERE id = ?1
            RETURNING {}
            "#,
            COLUMNS.replace("o.", "")
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(update.status)
            .bind(update.payment_status)
            .bind(&update.notes)
            .bind(update.expected_delivery)
            .bind(self.clock.now())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            id,
            from = %current.status,
            to = %order.status,
            payment_status = %order.payment_status,
            "Order updated"
        );
        Ok(order)
    }

    /// Deletes an order together with its items and its sale.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(id, "Order deleted");
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pool::{Database, DbConfig};
    use crate::repository::fixtures;
    use crate::retry::RetryConfig;
    use chrono::NaiveDate;
    use shoehub_core::filter::OrderQuery;
    use shoehub_core::{
        DiscountPolicy, FixedClock, NewCustomer, NewProduct, OrderStatus, PaymentStatus, StatusPolicy,
        ValidationError,
    };
    use std::collections::{BTreeMap, HashSet};
    use std::time::Duration;

    fn update_to(status: OrderStatus, payment_status: PaymentStatus) -> OrderUpdate {
        OrderUpdate {
            status,
            payment_status,
            notes: None,
            expected_delivery: None,
        }
    }

    #[tokio::test]
    async fn test_create_prices_and_numbers() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;

        let order = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1))
            .await
            .unwrap();

        assert_eq!(order.order_number, "SH-2026-000001");
        assert_eq!(order.subtotal, Money::from_major(250_000));
        assert_eq!(order.tax_amount, Money::from_major(27_500));
        assert_eq!(order.discount_amount, Money::zero());
        assert_eq!(order.total_amount, Money::from_major(277_500));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.totals().is_consistent());

        let second = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.oxford.id, 2))
            .await
            .unwrap();
        assert_eq!(second.order_number, "SH-2026-000002");
        assert_eq!(second.subtotal, Money::from_major(200_000));
    }

    #[tokio::test]
    async fn test_items_keep_customizations_and_price_snapshot() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;

        let mut custom = fixtures::item(seeded.sneaker.id, 2);
        let mut choices = BTreeMap::new();
        choices.insert("sole".to_string(), "eva".to_string());
        custom.customizations = Some(choices.clone());
        custom.special_notes = Some("Initials on the heel".to_string());

        let mut input = fixtures::order_for(seeded.customer.id, seeded.oxford.id, 1);
        input.items.push(custom);
        let order = db.orders().create(&input).await.unwrap();

        db.products()
            .update(
                seeded.sneaker.id,
                &NewProduct {
                    is_customizable: true,
                    customization_options: seeded.sneaker.customization_options.clone(),
                    ..fixtures::new_product(seeded.category.id, "Custom Canvas Sneakers", 999_000)
                },
            )
            .await
            .unwrap();

        let detail = db.orders().detail(order.id).await.unwrap();
        assert_eq!(detail.customer.id, seeded.customer.id);
        assert_eq!(detail.items.len(), 2);
        assert!(detail.sale.is_none());

        let sneaker_line = &detail.items[1];
        assert_eq!(sneaker_line.unit_price, Money::from_major(250_000));
        assert_eq!(sneaker_line.total_price, Money::from_major(500_000));
        assert_eq!(sneaker_line.customizations, Some(choices));
        assert_eq!(detail.order.subtotal, Money::from_major(600_000));
    }

    #[tokio::test]
    async fn test_unknown_customer_and_product() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;

        let err = db
            .orders()
            .create(&fixtures::order_for(9_999, seeded.sneaker.id, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, 9_999, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // failed attempts consume no numbers
        let order = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1))
            .await
            .unwrap();
        assert_eq!(order.order_number, "SH-2026-000001");
    }

    #[tokio::test]
    async fn test_validation_errors_name_the_field() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;

        let mut input = fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1);
        input.items.push(fixtures::item(seeded.oxford.id, 0));
        let err = db.orders().create(&input).await.unwrap_err();
        assert_eq!(err.validation().map(|v| v.field()), Some("items[1].quantity"));

        let mut input = fixtures::order_for(seeded.customer.id, seeded.oxford.id, 1);
        input.items[0].size = "46".to_string();
        let err = db.orders().create(&input).await.unwrap_err();
        assert_eq!(err.validation().map(|v| v.field()), Some("items[0].size"));

        let mut input = fixtures::order_for(seeded.customer.id, seeded.oxford.id, 1);
        let mut choices = BTreeMap::new();
        choices.insert("sole".to_string(), "eva".to_string());
        input.items[0].customizations = Some(choices);
        let err = db.orders().create(&input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut input = fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1);
        input.expected_delivery = NaiveDate::from_ymd_opt(2026, 10, 19);
        let err = db.orders().create(&input).await.unwrap_err();
        assert_eq!(
            err.validation().map(|v| v.field()),
            Some("expected_delivery")
        );

        let input = NewOrder {
            items: vec![],
            ..fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1)
        };
        let err = db.orders().create(&input).await.unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::Empty {
                field: "items".to_string()
            })
        );

        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_inactive_product_is_rejected() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;

        db.products()
            .update(
                seeded.oxford.id,
                &NewProduct {
                    active: false,
                    available_sizes: seeded.oxford.available_sizes.clone(),
                    available_colors: seeded.oxford.available_colors.clone(),
                    ..fixtures::new_product(seeded.category.id, "Leather Oxford", 100_000)
                },
            )
            .await
            .unwrap();

        let err = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.oxford.id, 1))
            .await
            .unwrap_err();
        assert_eq!(err.validation().map(|v| v.field()), Some("items[0].product_id"));
    }

    #[tokio::test]
    async fn test_discount_policies() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;

        // 100000.00 + 11000.00 tax
        let mut input = fixtures::order_for(seeded.customer.id, seeded.oxford.id, 1);
        input.discount_amount = Money::from_major(200_000);

        let err = db.orders().create(&input).await.unwrap_err();
        assert_eq!(err.validation().map(|v| v.field()), Some("discount_amount"));

        let clamp = OrderPolicy {
            discount: DiscountPolicy::Clamp,
            ..OrderPolicy::default()
        };
        let order = db
            .clone()
            .with_order_policy(clamp)
            .orders()
            .create(&input)
            .await
            .unwrap();
        assert_eq!(order.discount_amount, Money::from_major(111_000));
        assert_eq!(order.total_amount, Money::zero());

        let negative = OrderPolicy {
            discount: DiscountPolicy::AllowNegative,
            ..OrderPolicy::default()
        };
        let order = db
            .clone()
            .with_order_policy(negative)
            .orders()
            .create(&input)
            .await
            .unwrap();
        assert_eq!(order.total_amount, Money::from_major(-89_000));

        // discount equal to the subtotal leaves the tax
        input.discount_amount = Money::from_major(100_000);
        let order = db.orders().create(&input).await.unwrap();
        assert_eq!(order.total_amount, order.tax_amount);
    }

    #[tokio::test]
    async fn test_independent_updates() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;
        let order = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1))
            .await
            .unwrap();

        let delivered = db
            .orders()
            .update(
                order.id,
                &update_to(OrderStatus::Delivered, PaymentStatus::Pending),
            )
            .await
            .unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);

        let back = db
            .orders()
            .update(order.id, &update_to(OrderStatus::Pending, PaymentStatus::Paid))
            .await
            .unwrap();
        assert_eq!(back.status, OrderStatus::Pending);
        assert_eq!(back.payment_status, PaymentStatus::Paid);
        assert_eq!(back.total_amount, order.total_amount);
        assert_eq!(back.order_number, order.order_number);
    }

    #[tokio::test]
    async fn test_strict_updates() {
        let strict = OrderPolicy {
            status: StatusPolicy::Strict,
            ..OrderPolicy::default()
        };
        let db = fixtures::db().await.with_order_policy(strict);
        let seeded = fixtures::seed_catalog(&db).await;
        let order = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1))
            .await
            .unwrap();

        let err = db
            .orders()
            .update(
                order.id,
                &update_to(OrderStatus::Delivered, PaymentStatus::Pending),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InvalidTransition { .. })
        ));

        db.orders()
            .update(order.id, &update_to(OrderStatus::Shipped, PaymentStatus::Paid))
            .await
            .unwrap();
        db.orders()
            .update(order.id, &update_to(OrderStatus::Delivered, PaymentStatus::Paid))
            .await
            .unwrap();

        let err = db
            .orders()
            .update(order.id, &update_to(OrderStatus::Pending, PaymentStatus::Paid))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    fn rush_order(customer_id: i64, product_id: i64) -> NewOrder {
        let mut input = fixtures::order_for(customer_id, product_id, 1);
        input.notes = Some("rush".to_string());
        input.expected_delivery = NaiveDate::from_ymd_opt(2026, 10, 25);
        input
    }

    #[tokio::test]
    async fn test_overdue_order_keeps_its_delivery_date_on_update() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;
        let order = db
            .orders()
            .create(&rush_order(seeded.customer.id, seeded.sneaker.id))
            .await
            .unwrap();

        let later = db
            .clone()
            .with_clock(Arc::new(FixedClock::on(2026, 10, 30).unwrap()));
        let shipped = later
            .orders()
            .update(
                order.id,
                &OrderUpdate {
                    status: OrderStatus::Shipped,
                    payment_status: PaymentStatus::Pending,
                    notes: order.notes.clone(),
                    expected_delivery: order.expected_delivery,
                },
            )
            .await
            .unwrap();
        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert_eq!(shipped.expected_delivery, NaiveDate::from_ymd_opt(2026, 10, 25));

        // still bounded by the creation day
        let err = later
            .orders()
            .update(
                order.id,
                &OrderUpdate {
                    expected_delivery: NaiveDate::from_ymd_opt(2026, 10, 19),
                    ..update_to(OrderStatus::Shipped, PaymentStatus::Pending)
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.validation().map(|v| v.field()), Some("expected_delivery"));
    }

    #[tokio::test]
    async fn test_status_only_update_keeps_notes_and_delivery() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;
        let order = db
            .orders()
            .create(&rush_order(seeded.customer.id, seeded.sneaker.id))
            .await
            .unwrap();

        let shipped = db
            .orders()
            .update(order.id, &update_to(OrderStatus::Shipped, PaymentStatus::Paid))
            .await
            .unwrap();
        assert_eq!(shipped.notes.as_deref(), Some("rush"));
        assert_eq!(shipped.expected_delivery, NaiveDate::from_ymd_opt(2026, 10, 25));

        let renoted = db
            .orders()
            .update(
                order.id,
                &OrderUpdate {
                    notes: Some("leave at the gate".to_string()),
                    ..update_to(OrderStatus::Shipped, PaymentStatus::Paid)
                },
            )
            .await
            .unwrap();
        assert_eq!(renoted.notes.as_deref(), Some("leave at the gate"));
        assert_eq!(renoted.expected_delivery, order.expected_delivery);
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let db = fixtures::db().await;
        let err = db
            .orders()
            .update(7, &update_to(OrderStatus::Confirmed, PaymentStatus::Pending))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;
        let other = db
            .customers()
            .create(&NewCustomer {
                name: "Siti Rahma".to_string(),
                ..fixtures::new_customer("siti@example.com")
            })
            .await
            .unwrap();

        let first = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1))
            .await
            .unwrap();
        let mut two_lines = fixtures::order_for(other.id, seeded.sneaker.id, 1);
        two_lines.items.push(fixtures::item(seeded.oxford.id, 1));
        let second = db.orders().create(&two_lines).await.unwrap();
        db.orders()
            .update(second.id, &update_to(OrderStatus::Confirmed, PaymentStatus::Paid))
            .await
            .unwrap();

        let all = db.orders().list(&OrderQuery::new()).await.unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.items[0].order.id, second.id);
        assert_eq!(all.items[0].customer_name, "Siti Rahma");
        assert_eq!(all.items[0].item_count, 2);
        assert_eq!(all.items[1].order.id, first.id);

        let by_number = db
            .orders()
            .list(&OrderQuery::new().search("000001"))
            .await
            .unwrap();
        assert_eq!(by_number.total, 1);
        assert_eq!(by_number.items[0].order.id, first.id);

        let by_email = db
            .orders()
            .list(&OrderQuery::new().search("siti@"))
            .await
            .unwrap();
        assert_eq!(by_email.total, 1);

        let paid = db
            .orders()
            .list(
                &OrderQuery::new()
                    .status(OrderStatus::Confirmed)
                    .payment_status(PaymentStatus::Paid),
            )
            .await
            .unwrap();
        assert_eq!(paid.total, 1);

        let paged = db
            .orders()
            .list(&OrderQuery::new().per_page(1).page(2))
            .await
            .unwrap();
        assert_eq!(paged.items.len(), 1);
        assert_eq!(paged.last_page, 2);
        assert_eq!(paged.items[0].order.id, first.id);

        assert_eq!(db.orders().list_for_customer(other.id).await.unwrap().len(), 1);
        assert_eq!(db.orders().recent(5).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_removes_items_and_sale() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;
        let order = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1))
            .await
            .unwrap();
        db.sales()
            .record(&fixtures::sale_for(order.id, order.total_amount))
            .await
            .unwrap();

        db.orders().delete(order.id).await.unwrap();
        assert!(db.orders().find(order.id).await.unwrap().is_none());
        assert!(db.orders().items(order.id).await.unwrap().is_empty());
        assert!(db.sales().for_order(order.id).await.unwrap().is_none());
        assert_eq!(
            db.orders().delete(order.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_year_rollover() {
        let db = fixtures::db()
            .await
            .with_clock(Arc::new(FixedClock::on(2026, 12, 31).unwrap()));
        let seeded = fixtures::seed_catalog(&db).await;
        let input = fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1);

        let december = db.orders().create(&input).await.unwrap();
        assert_eq!(december.order_number, "SH-2026-000001");

        let next_year = db
            .clone()
            .with_clock(Arc::new(FixedClock::on(2027, 1, 1).unwrap()));
        let january = next_year.orders().create(&input).await.unwrap();
        assert_eq!(january.order_number, "SH-2027-000001");

        let again = db.orders().create(&input).await.unwrap();
        assert_eq!(again.order_number, "SH-2026-000002");
    }

    #[tokio::test]
    async fn test_sequence_seeded_from_existing_numbers() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;
        let input = fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1);

        let order = db.orders().create(&input).await.unwrap();
        sqlx::query("UPDATE orders SET order_number = 'SH-2026-000041' WHERE id = ?1")
            .bind(order.id)
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("DELETE FROM order_number_sequences")
            .execute(db.pool())
            .await
            .unwrap();

        let next = db.orders().create(&input).await.unwrap();
        assert_eq!(next.order_number, "SH-2026-000042");
        assert!(db
            .orders()
            .find_by_number("SH-2026-000041")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_exhausted_sequence() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;
        sqlx::query("INSERT INTO order_number_sequences (year, last_value) VALUES (2026, 999999)")
            .execute(db.pool())
            .await
            .unwrap();

        let err = db
            .orders()
            .create(&fixtures::order_for(seeded.customer.id, seeded.sneaker.id, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::OrderNumberExhausted { year: 2026, .. })
        ));
        assert_eq!(db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creation_yields_unique_numbers() {
        let path = std::env::temp_dir().join(format!("shoehub-{}.db", uuid::Uuid::new_v4()));
        let policy = OrderPolicy {
            retry: RetryConfig::with_attempts(20),
            ..OrderPolicy::default()
        };
        let db = Database::new(
            DbConfig::new(&path)
                .max_connections(8)
                .busy_timeout(Duration::from_secs(10))
                .order_policy(policy),
        )
        .await
        .unwrap()
        .with_clock(Arc::new(fixtures::clock()));
        let seeded = fixtures::seed_catalog(&db).await;

        let mut handles = Vec::new();
        for _ in 0..100 {
            let db = db.clone();
            let input = fixtures::order_for(seeded.customer.id, seeded.oxford.id, 1);
            handles.push(tokio::spawn(async move {
                db.orders().create(&input).await
            }));
        }

        let mut numbers = HashSet::new();
        for handle in handles {
            let order = handle.await.unwrap().unwrap();
            numbers.insert(order.order_number);
        }

        assert_eq!(numbers.len(), 100);
        for n in 1..=100 {
            assert!(numbers.contains(&format!("SH-2026-{:06}", n)));
        }

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
