//! # Category Repository
//!
//! Shoe categories (Sneakers, Formal Shoes, Boots, ...). A category cannot
//! be deleted while products still reference it.

use chrono::Utc;
use shoehub_core::validation::validate_category;
use shoehub_core::{Category, NewCategory, ValidationError};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn create(&self, input: &NewCategory) -> DbResult<Category> {
        validate_category(input)?;
        let name = input.name.trim();

        debug!(name = %name, "Creating category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, name, description, active, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(&input.description)
        .bind(input.active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::Validation(ValidationError::Duplicate {
                field: "name".to_string(),
                value: name.to_string(),
            }),
            other => other,
        })?;

        info!(id = category.id, "Category created");
        Ok(category)
    }

    pub async fn get(&self, id: i64) -> DbResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description, active, created_at, updated_at \
             FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id))
    }

    /// All categories by name; `active_only` hides retired ones.
    pub async fn list(&self, active_only: bool) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, active, created_at, updated_at \
             FROM categories WHERE (?1 = 0 OR active = 1) ORDER BY name",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, active, created_at, updated_at \
             FROM categories WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    /// Deletes a category that no product references.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if products > 0 {
            return Err(DbError::Integrity(format!(
                "category {} still has {} product(s)",
                id, products
            )));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                // a product was added between the check and the delete
                DbError::ForeignKeyViolation { message } => DbError::Integrity(message),
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        info!(id, "Category deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repository::fixtures;

    fn boots() -> NewCategory {
        NewCategory {
            name: "Boots".to_string(),
            description: Some("Work and fashion boots".to_string()),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_create_list_get() {
        let db = fixtures::db().await;
        let repo = db.categories();

        let created = repo.create(&boots()).await.unwrap();
        let mut retired = boots();
        retired.name = "Clogs".to_string();
        retired.active = false;
        repo.create(&retired).await.unwrap();

        assert_eq!(repo.get(created.id).await.unwrap(), created);
        assert_eq!(repo.list(false).await.unwrap().len(), 2);
        assert_eq!(repo.list(true).await.unwrap().len(), 1);
        assert!(repo.find_by_name("Boots").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = fixtures::db().await;
        db.categories().create(&boots()).await.unwrap();
        let err = db.categories().create(&boots()).await.unwrap_err();
        assert_eq!(err.validation().map(|v| v.field()), Some("name"));
    }

    #[tokio::test]
    async fn test_delete_restricted_by_products() {
        let db = fixtures::db().await;
        let seeded = fixtures::seed_catalog(&db).await;

        let err = db.categories().delete(seeded.category.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Integrity);

        let empty = db.categories().create(&boots()).await.unwrap();
        db.categories().delete(empty.id).await.unwrap();
        assert_eq!(
            db.categories().delete(empty.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
