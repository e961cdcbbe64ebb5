use sqlx::PgPool;
use trendwatch_core::WatchlistFile;

use crate::DbError;

/// Counts of rows touched by [`seed_watchlist`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub keywords_inserted: usize,
    pub keywords_updated: usize,
    pub sources_inserted: usize,
    pub sources_updated: usize,
}

/// Upsert the watchlist's keywords and sources by name.
///
/// Existing keywords only have their `active` flag refreshed; name and
/// category are fixed once created. Sources are fully overwritten from the
/// file. All upserts run inside a single transaction; if any operation fails
/// the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_watchlist(pool: &PgPool, watchlist: &WatchlistFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for keyword in &watchlist.keywords {
        // xmax is zero only for rows created by this statement.
        let inserted: bool = sqlx::query_scalar(
            "INSERT INTO keywords (name, category, description, active) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (name) DO UPDATE SET active = EXCLUDED.active \
             RETURNING (xmax = 0)",
        )
        .bind(keyword.name.trim())
        .bind(keyword.category.as_str())
        .bind(&keyword.description)
        .bind(keyword.active)
        .fetch_one(&mut *tx)
        .await?;

        if inserted {
            summary.keywords_inserted += 1;
        } else {
            summary.keywords_updated += 1;
        }
    }

    for source in &watchlist.sources {
        let inserted: bool = sqlx::query_scalar(
            "INSERT INTO sources (name, type, url, notes, active) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (name) DO UPDATE SET \
                 type = EXCLUDED.type, \
                 url = EXCLUDED.url, \
                 notes = EXCLUDED.notes, \
                 active = EXCLUDED.active \
             RETURNING (xmax = 0)",
        )
        .bind(source.name.trim())
        .bind(source.source_type.trim().to_ascii_lowercase())
        .bind(source.url.trim())
        .bind(&source.notes)
        .bind(source.active)
        .fetch_one(&mut *tx)
        .await?;

        if inserted {
            summary.sources_inserted += 1;
        } else {
            summary.sources_updated += 1;
        }
    }

    tx.commit().await?;

    tracing::info!(
        keywords_inserted = summary.keywords_inserted,
        keywords_updated = summary.keywords_updated,
        sources_inserted = summary.sources_inserted,
        sources_updated = summary.sources_updated,
        "watchlist seeded"
    );

    Ok(summary)
}
