//! Category repository.
//!
//! Two contracts here are deliberate and observable:
//! - `update` checks existence before ownership, so a foreign category is
//!   reported as forbidden rather than missing (the only path that does).
//! - `delete` runs the cascade (notes first, then the category) inside one
//!   transaction; no reader may observe a half-deleted state.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notevault_core::{Category, Error, Result};

const CATEGORY_COLUMNS: &str = "id, title, owner_id, created_at";

/// PostgreSQL implementation of the category store.
pub struct PgCategoryRepository {
    pool: Pool<Postgres>,
}

fn map_category(row: &sqlx::postgres::PgRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
    }
}

impl PgCategoryRepository {
    /// Create a new PgCategoryRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a category owned by `owner_id`.
    pub async fn create(&self, owner_id: Uuid, title: &str) -> Result<Category> {
        if title.is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO category (id, title, owner_id, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(title)
        .bind(owner_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_category(&row))
    }

    /// List the owner's categories in insertion order.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM category WHERE owner_id = $1 ORDER BY created_at ASC, id ASC",
            CATEGORY_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_category).collect())
    }

    /// Rename a category. Existence is checked before ownership: an unknown
    /// id is NotFound, a foreign one is Forbidden.
    pub async fn update(&self, owner_id: Uuid, id: Uuid, title: &str) -> Result<Category> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM category WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound("Category not found.".to_string()))?;

        let existing = map_category(&row);
        if existing.owner_id != owner_id {
            return Err(Error::Forbidden(
                "You are not authorized to edit this category.".to_string(),
            ));
        }
        if title.is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }

        let row = sqlx::query(&format!(
            "UPDATE category SET title = $1 WHERE id = $2 RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(title)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_category(&row))
    }

    /// Delete a category and every note filed under it, atomically.
    ///
    /// Returns the number of notes removed alongside the category. Absent and
    /// foreign categories are both NotFound (the read-path convention).
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Row lock so a concurrent delete or note insert serializes behind us.
        let found: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM category WHERE id = $1 AND owner_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if found.is_none() {
            tx.rollback().await.map_err(Error::Database)?;
            return Err(Error::NotFound("Category not found".to_string()));
        }

        let notes_deleted = sqlx::query("DELETE FROM note WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        Ok(notes_deleted)
    }
}
