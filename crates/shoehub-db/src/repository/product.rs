//! # Product Repository
//!
//! Database operations for the shoe catalog.
//!
//! ## Storage
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products row                          Product                          │
//! │                                                                         │
//! │  base_price        INTEGER  25000000 ─► Money 250000.00                 │
//! │  available_sizes   TEXT ["40","41"]  ─► Vec<String>                     │
//! │  available_colors  TEXT ["black"]    ─► Vec<String>                     │
//! │  customization_    TEXT {"sole":[..]}─► Option<CustomizationOptions>    │
//! │    options         (NULL allowed)                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Order items keep their own price snapshot, so editing a product never
//! changes an existing order. Deleting a product that appears on any order
//! item is refused; deactivate it instead.

use chrono::{DateTime, Utc};
use shoehub_core::filter::{Paginated, ProductQuery};
use shoehub_core::validation::validate_product;
use shoehub_core::{CustomizationOptions, Money, NewProduct, Product};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use super::{from_json, to_json};
use crate::error::{DbError, DbResult};
use crate::query::WhereClause;

const COLUMNS: &str = "p.id, p.category_id, p.name, p.description, p.base_price, \
                       p.available_sizes, p.available_colors, p.customization_options, \
                       p.image_url, p.is_customizable, p.active, p.created_at, p.updated_at";

/// Raw `products` row; JSON columns still encoded.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    category_id: i64,
    name: String,
    description: Option<String>,
    base_price: Money,
    available_sizes: String,
    available_colors: String,
    customization_options: Option<String>,
    image_url: Option<String>,
    is_customizable: bool,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        let customization_options = row
            .customization_options
            .as_deref()
            .map(from_json::<CustomizationOptions>)
            .transpose()?;

        Ok(Product {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            description: row.description,
            base_price: row.base_price,
            available_sizes: from_json(&row.available_sizes)?,
            available_colors: from_json(&row.available_colors)?,
            customization_options,
            image_url: row.image_url,
            is_customizable: row.is_customizable,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Loads one product through any executor (pool or open transaction).
pub(crate) async fn fetch_product<'e, E>(executor: E, id: i64) -> DbResult<Option<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM products p WHERE p.id = ?1", COLUMNS);
    sqlx::query_as::<_, ProductRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?
        .map(Product::try_from)
        .transpose()
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    async fn ensure_category(&self, category_id: i64) -> DbResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await?;
        exists
            .map(|_| ())
            .ok_or_else(|| DbError::not_found("Category", category_id))
    }

    /// Inserts a product.
    ///
    /// ## Errors
    /// - invalid form → `Validation`
    /// - unknown category → `NotFound`
    pub async fn create(&self, input: &NewProduct) -> DbResult<Product> {
        validate_product(input)?;
        self.ensure_category(input.category_id).await?;

        debug!(name = %input.name, category_id = input.category_id, "Creating product");

        let sql = format!(
            r#"
            INSERT INTO products (
                category_id, name, description, base_price,
                available_sizes, available_colors, customization_options,
                image_url, is_customizable, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            RETURNING {}
            "#,
            COLUMNS.replace("p.", "")
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(input.category_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.base_price)
            .bind(to_json(&input.available_sizes)?)
            .bind(to_json(&input.available_colors)?)
            .bind(
                input
                    .customization_options
                    .as_ref()
                    .map(to_json)
                    .transpose()?,
            )
            .bind(&input.image_url)
            .bind(input.is_customizable)
            .bind(input.active)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        let product = Product::try_from(row)?;
        info!(id = product.id, price = %product.base_price, "Product created");
        Ok(product)
    }

    /// Replaces a product's fields. Existing order items keep their prices.
    pub async fn update(&self, id: i64, input: &NewProduct) -> DbResult<Product> {
        validate_product(input)?;
        self.ensure_category(input.category_id).await?;

        debug!(id, "Updating product");

        let sql = format!(
            r#"
            UPDATE products
            SET category_id = ?2, name = ?3, description = ?4, base_price = ?5,
                available_sizes = ?6, available_colors = ?7, customization_options = ?8,
                image_url = ?9, is_customizable = ?10, active = ?11, updated_at = ?12
            WHERE id = ?1
            RETURNING {}
            "#,
            COLUMNS.replace("p.", "")
        );

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .bind(input.category_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.base_price)
            .bind(to_json(&input.available_sizes)?)
            .bind(to_json(&input.available_colors)?)
            .bind(
                input
                    .customization_options
                    .as_ref()
                    .map(to_json)
                    .transpose()?,
            )
            .bind(&input.image_url)
            .bind(input.is_customizable)
            .bind(input.active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        Product::try_from(row)
    }

    pub async fn find(&self, id: i64) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Gets a product, failing with `NotFound` when missing.
    pub async fn get(&self, id: i64) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists the catalog, newest first.
    pub async fn list(&self, query: &ProductQuery) -> DbResult<Paginated<Product>> {
        let clause = WhereClause::from_predicates(&query.predicates());
        let page = query.page;

        let count_sql = format!("SELECT COUNT(*) FROM products p{}", clause.sql());
        let total: i64 = clause
            .bind_scalar(sqlx::query_scalar(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let list_sql = format!(
            "SELECT {} FROM products p{} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?",
            COLUMNS,
            clause.sql()
        );
        let rows = clause
            .bind_as(sqlx::query_as::<_, ProductRow>(&list_sql))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Product::try_from)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(total, returned = items.len(), "Listed products");
        Ok(Paginated::new(items, total, page))
    }

    /// Number of products offered for sale.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Deletes a product that no order item references.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let referenced: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if referenced > 0 {
            return Err(DbError::Integrity(format!(
                "product {} appears on {} order item(s); deactivate it instead",
                id, referenced
            )));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::ForeignKeyViolation { message } => DbError::Integrity(message),
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(id, "Product deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
