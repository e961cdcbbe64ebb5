//! Database operations for the `keywords` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendwatch_core::{Keyword, KeywordCategory};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `keywords` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<KeywordRow> for Keyword {
    fn from(row: KeywordRow) -> Self {
        let category = KeywordCategory::parse(&row.category).unwrap_or_else(|| {
            tracing::warn!(
                keyword = %row.name,
                category = %row.category,
                "unknown keyword category; treating as 'other'"
            );
            KeywordCategory::Other
        });
        Keyword {
            id: row.id,
            name: row.name,
            category,
            description: row.description,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all keywords with `active = true`, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_active_keywords(pool: &PgPool) -> Result<Vec<KeywordRow>, DbError> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        "SELECT id, name, category, description, active, created_at \
         FROM keywords \
         WHERE active = true \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every keyword, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_keywords(pool: &PgPool) -> Result<Vec<KeywordRow>, DbError> {
    let rows = sqlx::query_as::<_, KeywordRow>(
        "SELECT id, name, category, description, active, created_at \
         FROM keywords \
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Toggle a keyword's `active` flag by name. This is the only mutation a
/// keyword accepts after creation.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no keyword has that name, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_keyword_active(pool: &PgPool, name: &str, active: bool) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE keywords SET active = $1 WHERE name = $2")
        .bind(active)
        .bind(name)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
