//! Database operations for the `sources` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendwatch_core::Source;

use crate::DbError;

/// A row from the `sources` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceRow {
    pub id: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub source_type: String,
    pub url: String,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<SourceRow> for Source {
    fn from(row: SourceRow) -> Self {
        Source {
            id: row.id,
            name: row.name,
            source_type: row.source_type,
            url: row.url,
            notes: row.notes,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

/// Returns all sources with `active = true`, ordered by id.
///
/// Rows are returned regardless of `type`; resolving the adapter kind is the
/// caller's job.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_sources(pool: &PgPool) -> Result<Vec<SourceRow>, DbError> {
    let rows = sqlx::query_as::<_, SourceRow>(
        "SELECT id, name, type, url, notes, active, created_at \
         FROM sources \
         WHERE active = true \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every source, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sources(pool: &PgPool) -> Result<Vec<SourceRow>, DbError> {
    let rows = sqlx::query_as::<_, SourceRow>(
        "SELECT id, name, type, url, notes, active, created_at \
         FROM sources \
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
