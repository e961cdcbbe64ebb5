//! Database operations for the `items` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendwatch_core::{Item, NewItem};

use crate::DbError;

/// A row from the `items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub source_name: String,
    pub source_type: String,
    pub keyword_name: String,
    pub keyword_id: i64,
    pub title: String,
    pub url: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    pub collected_at: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            source_name: row.source_name,
            source_type: row.source_type,
            keyword_name: row.keyword_name,
            keyword_id: row.keyword_id,
            title: row.title,
            url: row.url,
            content: row.content,
            published_at: row.published_at,
            collected_at: row.collected_at,
            timestamp: row.timestamp,
        }
    }
}

const ITEM_COLUMNS: &str = "id, source_name, source_type, keyword_name, keyword_id, title, url, \
     content, published_at, collected_at, timestamp";

/// Write a batch of items in a single transaction.
///
/// Either every item in the batch is stored or none is. Each row's
/// `timestamp` is set by the database at insert time. Returns the number of
/// rows written; an empty batch is a no-op.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; the batch is rolled back.
pub async fn insert_items(pool: &PgPool, items: &[NewItem]) -> Result<usize, DbError> {
    if items.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for item in items {
        sqlx::query(
            "INSERT INTO items \
                 (source_name, source_type, keyword_name, keyword_id, title, url, content, \
                  published_at, collected_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&item.source_name)
        .bind(&item.source_type)
        .bind(&item.keyword_name)
        .bind(item.keyword_id)
        .bind(&item.title)
        .bind(&item.url)
        .bind(&item.content)
        .bind(item.published_at)
        .bind(item.collected_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(items.len())
}

/// Returns items whose insertion `timestamp` lies in `[start, end)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_items_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<ItemRow>, DbError> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items \
         WHERE timestamp >= $1 AND timestamp < $2 \
         ORDER BY timestamp, id"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the newest `limit` items, optionally restricted to one keyword.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_items(
    pool: &PgPool,
    keyword: Option<&str>,
    limit: i64,
) -> Result<Vec<ItemRow>, DbError> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM items \
         WHERE ($1::TEXT IS NULL OR keyword_name = $1) \
         ORDER BY timestamp DESC, id DESC \
         LIMIT $2"
    ))
    .bind(keyword)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
