//! Item retrieval ranked by vector distance.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use trove_core::{
    Candidate, Error, Item, ItemMetadata, ItemRepository, Result, SearchFilters, TagCount,
};

use crate::filter_sql::{FilterQueryBuilder, QueryParam};

/// Item columns selected by every query, aliased off `i`.
const ITEM_COLUMNS: &str = "i.id, i.user_id, i.title, i.description, i.content, i.content_type, \
     i.url, i.source_domain, i.metadata, i.tags, i.collection_id, i.is_favorite, i.is_archived, \
     i.created_at, i.updated_at, i.accessed_at";

/// PostgreSQL implementation of [`ItemRepository`].
#[derive(Clone)]
pub struct PgItemRepository {
    pool: Pool<Postgres>,
}

impl PgItemRepository {
    /// Create a new PgItemRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Map a row carrying the [`ITEM_COLUMNS`] selection into an [`Item`].
///
/// Rows with a content type the enum no longer knows fall back to the
/// default rather than failing the whole result set.
fn map_item_row(row: &PgRow) -> Item {
    let content_type: String = row.get("content_type");
    let metadata: serde_json::Value = row.get("metadata");
    Item {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get::<Option<String>, _>("title").unwrap_or_default(),
        description: row.get("description"),
        content: row.get("content"),
        content_type: content_type.parse().unwrap_or_default(),
        url: row.get("url"),
        source_domain: row.get("source_domain"),
        metadata: ItemMetadata::from_json(metadata),
        tags: row.get("tags"),
        collection_id: row.get("collection_id"),
        is_favorite: row.get("is_favorite"),
        is_archived: row.get("is_archived"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        accessed_at: row.get("accessed_at"),
    }
}

fn map_candidate_row(row: &PgRow) -> Candidate {
    Candidate {
        item: map_item_row(row),
        distance: row.get::<f64, _>("distance") as f32,
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn search_by_vector(
        &self,
        user_id: Uuid,
        vector: &Vector,
        model: &str,
        filters: &SearchFilters,
        limit: i64,
    ) -> Result<Vec<Candidate>> {
        // $1 vector, $2 owner, $3 model; filter placeholders continue from
        // there, with the limit bound last.
        let (clauses, params) = FilterQueryBuilder::new(filters, 3).build();
        let filter_sql: String = clauses.iter().map(|c| format!(" AND {}", c)).collect();
        let limit_placeholder = 3 + params.len() + 1;

        let sql = format!(
            "SELECT {ITEM_COLUMNS}, (e.embedding <=> $1::vector) AS distance
             FROM items i
             JOIN embeddings e ON i.id = e.item_id
             WHERE i.user_id = $2 AND e.embedding_model = $3{filter_sql}
             ORDER BY e.embedding <=> $1::vector
             LIMIT ${limit_placeholder}"
        );

        let mut query = sqlx::query(&sql).bind(vector).bind(user_id).bind(model);
        for param in &params {
            query = match param {
                QueryParam::Uuid(id) => query.bind(id),
                QueryParam::Float(val) => query.bind(val),
                QueryParam::Timestamp(ts) => query.bind(ts),
                QueryParam::Bool(b) => query.bind(b),
                QueryParam::String(s) => query.bind(s),
                QueryParam::StringArray(arr) => query.bind(arr),
            };
        }

        let rows = query
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(map_candidate_row).collect())
    }

    async fn find_similar_to_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        model: &str,
        limit: i64,
    ) -> Result<Vec<Candidate>> {
        // Two steps: fetch the source item's stored embedding and content
        // type, then rank its same-type neighbours by distance.
        let source = sqlx::query(
            "SELECT e.embedding, i.content_type
             FROM embeddings e
             JOIN items i ON e.item_id = i.id
             WHERE e.item_id = $1 AND i.user_id = $2 AND e.embedding_model = $3",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(model)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let source = source.ok_or(Error::ItemNotFound(item_id))?;
        let embedding: Vector = source.get("embedding");
        let content_type: String = source.get("content_type");

        let sql = format!(
            "SELECT {ITEM_COLUMNS}, (e.embedding <=> $1::vector) AS distance
             FROM items i
             JOIN embeddings e ON i.id = e.item_id
             WHERE i.user_id = $2
               AND e.embedding_model = $3
               AND i.id != $4
               AND i.content_type = $5
               AND i.is_archived = FALSE
             ORDER BY e.embedding <=> $1::vector
             LIMIT $6"
        );

        let rows = sqlx::query(&sql)
            .bind(&embedding)
            .bind(user_id)
            .bind(model)
            .bind(item_id)
            .bind(&content_type)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(map_candidate_row).collect())
    }

    async fn list_recent(&self, user_id: Uuid, limit: i64) -> Result<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS}
             FROM items i
             WHERE i.user_id = $1 AND i.is_archived = FALSE
             ORDER BY i.created_at DESC
             LIMIT $2"
        );

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(map_item_row).collect())
    }

    async fn popular_tags(&self, user_id: Uuid, limit: i64) -> Result<Vec<TagCount>> {
        let rows = sqlx::query(
            "SELECT UNNEST(tags) AS tag, COUNT(*) AS count
             FROM items
             WHERE user_id = $1
             GROUP BY tag
             ORDER BY count DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|row| TagCount {
                tag: row.get("tag"),
                count: row.get("count"),
            })
            .collect())
    }
}
