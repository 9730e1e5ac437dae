//! Embedding persistence, one row per item and model.

use chrono::Utc;
use pgvector::Vector;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use trove_core::{new_v7, Embedding, Error, Result};

/// PostgreSQL embedding repository.
///
/// `(item_id, embedding_model)` is unique: writing an embedding for an
/// item under a model it already has replaces the stored vector in place.
#[derive(Clone)]
pub struct PgEmbeddingRepository {
    pool: Pool<Postgres>,
}

impl PgEmbeddingRepository {
    /// Create a new PgEmbeddingRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert or replace the embedding for an item under the given model.
    ///
    /// Returns the id of the stored row, which is stable across replaces.
    pub async fn upsert(&self, item_id: Uuid, vector: &Vector, model: &str) -> Result<Uuid> {
        let row = sqlx::query(
            "INSERT INTO embeddings (id, item_id, embedding, embedding_model, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (item_id, embedding_model)
             DO UPDATE SET embedding = EXCLUDED.embedding, created_at = EXCLUDED.created_at
             RETURNING id",
        )
        .bind(new_v7())
        .bind(item_id)
        .bind(vector)
        .bind(model)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.get("id"))
    }

    /// All stored embeddings for an item, ordered by model name.
    pub async fn get_for_item(&self, item_id: Uuid) -> Result<Vec<Embedding>> {
        let rows = sqlx::query(
            "SELECT id, item_id, embedding, embedding_model, created_at
             FROM embeddings
             WHERE item_id = $1
             ORDER BY embedding_model",
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let embeddings = rows
            .into_iter()
            .map(|row| Embedding {
                id: row.get("id"),
                item_id: row.get("item_id"),
                vector: row.get("embedding"),
                model: row.get("embedding_model"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(embeddings)
    }

    /// Remove all embeddings for an item, across models.
    pub async fn delete_for_item(&self, item_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM embeddings WHERE item_id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }
}
