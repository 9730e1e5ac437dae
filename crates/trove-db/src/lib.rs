//! PostgreSQL + pgvector storage layer for trove.
//!
//! This crate provides:
//! - Connection pool management with health metrics
//! - Item retrieval ranked by vector distance, restricted by structured
//!   filters (`PgItemRepository`)
//! - Embedding persistence, one row per item and model
//!   (`PgEmbeddingRepository`)
//! - Parameterized WHERE-clause generation for search filters
//!   (`FilterQueryBuilder`)
//! - Test fixtures with per-test schema isolation

pub mod embeddings;
pub mod filter_sql;
pub mod items;
pub mod pool;

// Test fixtures are always compiled so downstream crates' integration tests
// can use them; nothing connects until a test constructs a database.
pub mod test_fixtures;

// Re-export core types so consumers can use trove_db::{Item, Error, ...}
pub use trove_core::*;

pub use embeddings::PgEmbeddingRepository;
pub use filter_sql::{FilterQueryBuilder, QueryParam};
pub use items::PgItemRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};

/// Escape SQL LIKE/ILIKE pattern special characters in user input.
///
/// Escapes backslash, percent, and underscore so the input matches
/// literally inside a `%...%` pattern.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Item repository for search and retrieval.
    pub items: PgItemRepository,
    /// Embedding repository for vector storage.
    pub embeddings: PgEmbeddingRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            items: PgItemRepository::new(pool.clone()),
            embeddings: PgEmbeddingRepository::new(pool.clone()),
            pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_plain_text() {
        assert_eq!(escape_like("red shoes"), "red shoes");
    }

    #[test]
    fn test_escape_like_percent() {
        assert_eq!(escape_like("100% cotton"), "100\\% cotton");
    }

    #[test]
    fn test_escape_like_underscore() {
        assert_eq!(escape_like("todo_list"), "todo\\_list");
    }

    #[test]
    fn test_escape_like_backslash_first() {
        // Backslash must be escaped before the wildcards, or the escape
        // characters we add would themselves get doubled.
        assert_eq!(escape_like("a\\%b"), "a\\\\\\%b");
    }
}
