//! Note repository and the query/search layer.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use notevault_core::{
    CreateNoteRequest, Error, Note, Result, UpdateNoteRequest, DEFAULT_FONT_SIZE,
    DEFAULT_FONT_STYLE,
};

use crate::escape_like;

const NOTE_COLUMNS: &str =
    "id, title, content, category_id, owner_id, pinned, font_size, font_style, created_at, updated_at";

/// Pin-first ordering: pinned notes ahead, insertion order within each
/// partition (UUIDv7 ids are time-ordered, so id is a stable tiebreaker).
const PIN_FIRST_ORDER: &str = "ORDER BY pinned DESC, created_at ASC, id ASC";

/// PostgreSQL implementation of the note store.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

fn map_note(row: &sqlx::postgres::PgRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        category_id: row.get("category_id"),
        owner_id: row.get("owner_id"),
        pinned: row.get("pinned"),
        font_size: row.get("font_size"),
        font_style: row.get("font_style"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// True if the category exists and belongs to `owner_id`.
    async fn category_owned(&self, owner_id: Uuid, category_id: Uuid) -> Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM category WHERE id = $1 AND owner_id = $2)")
            .bind(category_id)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    /// Create a note. Title, content, and category are required, and the
    /// category must be one of the caller's own: a foreign or unknown
    /// category is a validation error ("Invalid category"), not a 404.
    pub async fn create(&self, owner_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let (title, content, category_id) = match (&req.title, &req.content, req.category) {
            (Some(title), Some(content), Some(category_id))
                if !title.is_empty() && !content.is_empty() =>
            {
                (title, content, category_id)
            }
            _ => return Err(Error::Validation("All fields are required".to_string())),
        };

        if !self.category_owned(owner_id, category_id).await? {
            return Err(Error::Validation("Invalid category".to_string()));
        }

        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO note (id, title, content, category_id, owner_id, pinned, font_size, font_style, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(Uuid::now_v7())
        .bind(title)
        .bind(content)
        .bind(category_id)
        .bind(owner_id)
        .bind(req.pinned)
        .bind(req.font_size.unwrap_or(DEFAULT_FONT_SIZE))
        .bind(req.font_style.as_deref().unwrap_or(DEFAULT_FONT_STYLE))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_note(&row))
    }

    /// Fetch one of the caller's notes. Absent and foreign notes are both
    /// NotFound.
    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Note> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM note WHERE id = $1 AND owner_id = $2",
            NOTE_COLUMNS
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound("Note not found".to_string()))?;

        Ok(map_note(&row))
    }

    /// List the caller's notes, pinned first.
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM note WHERE owner_id = $1 {}",
            NOTE_COLUMNS, PIN_FIRST_ORDER
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_note).collect())
    }

    /// List the caller's notes in one category, pinned first. The category
    /// is checked even when no notes would match.
    pub async fn list_by_category(&self, owner_id: Uuid, category_id: Uuid) -> Result<Vec<Note>> {
        if !self.category_owned(owner_id, category_id).await? {
            return Err(Error::NotFound("Category not found".to_string()));
        }

        let rows = sqlx::query(&format!(
            "SELECT {} FROM note WHERE owner_id = $1 AND category_id = $2 {}",
            NOTE_COLUMNS, PIN_FIRST_ORDER
        ))
        .bind(owner_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_note).collect())
    }

    /// Partial update: only supplied fields change. Re-filing under a new
    /// category revalidates ownership of that category; an explicit null
    /// detaches the note from its category.
    pub async fn update(&self, owner_id: Uuid, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let existing = self.get(owner_id, id).await?;

        if let Some(Some(category_id)) = req.category {
            if !self.category_owned(owner_id, category_id).await? {
                return Err(Error::Validation("Invalid category".to_string()));
            }
        }
        let category_id = match req.category {
            Some(value) => value,
            None => existing.category_id,
        };

        let row = sqlx::query(&format!(
            "UPDATE note
             SET title = $1, content = $2, category_id = $3, pinned = $4,
                 font_size = $5, font_style = $6, updated_at = $7
             WHERE id = $8 AND owner_id = $9
             RETURNING {}",
            NOTE_COLUMNS
        ))
        .bind(req.title.unwrap_or(existing.title))
        .bind(req.content.unwrap_or(existing.content))
        .bind(category_id)
        .bind(req.pinned.unwrap_or(existing.pinned))
        .bind(req.font_size.unwrap_or(existing.font_size))
        .bind(req.font_style.unwrap_or(existing.font_style))
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_note(&row))
    }

    /// Delete one of the caller's notes.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Note not found".to_string()));
        }
        Ok(())
    }

    /// Flip the pinned flag and return the new state.
    pub async fn toggle_pin(&self, owner_id: Uuid, id: Uuid) -> Result<bool> {
        sqlx::query_scalar(
            "UPDATE note SET pinned = NOT pinned, updated_at = $1
             WHERE id = $2 AND owner_id = $3
             RETURNING pinned",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or_else(|| Error::NotFound("Note not found".to_string()))
    }

    /// Case-insensitive substring search over the caller's note titles and
    /// their categories' titles. One query, so the union is deduplicated by
    /// row identity. Result order carries no guarantee.
    pub async fn search(&self, owner_id: Uuid, query: &str) -> Result<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(query));

        let rows = sqlx::query(&format!(
            "SELECT n.{} FROM note n
             LEFT JOIN category c ON c.id = n.category_id
             WHERE n.owner_id = $1
               AND (n.title ILIKE $2 OR c.title ILIKE $2)",
            NOTE_COLUMNS.replace(", ", ", n.")
        ))
        .bind(owner_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_note).collect())
    }
}
