//! # notevault-db
//!
//! PostgreSQL storage layer for notevault.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, categories, and notes
//! - The query/search layer (owner-scoped ILIKE substring matching)
//!
//! ## Example
//!
//! ```rust,ignore
//! use notevault_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/notevault").await?;
//!     let categories = db.categories.list(owner_id).await?;
//!     Ok(())
//! }
//! ```

pub mod categories;
pub mod notes;
pub mod pool;
// Note: Always compiled so integration tests (in tests/) can use the fixtures
pub mod test_fixtures;
pub mod users;

// Re-export core types
pub use notevault_core::*;

pub use categories::PgCategoryRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use users::{PgUserRepository, LOGIN_FAILED_MESSAGE};

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Credential store and profile operations.
    pub users: PgUserRepository,
    /// Category store (incl. transactional cascade delete).
    pub categories: PgCategoryRepository,
    /// Note store and query/search layer.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            categories: PgCategoryRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
