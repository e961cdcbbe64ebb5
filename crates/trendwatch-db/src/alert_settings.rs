//! The singleton `alert_settings` row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trendwatch_core::{AlertSettings, AlertSettingsUpdate};

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct AlertSettingsRow {
    threshold: i32,
    email: Option<String>,
    webhook: Option<String>,
    enabled: bool,
    updated_at: DateTime<Utc>,
}

impl From<AlertSettingsRow> for AlertSettings {
    fn from(row: AlertSettingsRow) -> Self {
        AlertSettings {
            threshold: row.threshold,
            email: row.email,
            webhook: row.webhook,
            enabled: row.enabled,
            updated_at: Some(row.updated_at),
        }
    }
}

/// Read the alert settings.
///
/// When no settings have ever been written this returns
/// [`AlertSettings::default`] (threshold 50, enabled, no channels).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_alert_settings(pool: &PgPool) -> Result<AlertSettings, DbError> {
    let row = sqlx::query_as::<_, AlertSettingsRow>(
        "SELECT threshold, email, webhook, enabled, updated_at \
         FROM alert_settings \
         WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(AlertSettings::from).unwrap_or_default())
}

/// Validate and merge `update` over the stored settings, then upsert.
///
/// Returns the settings as stored.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if the update is out of range, or
/// [`DbError::Sqlx`] if the read or write fails.
pub async fn set_alert_settings(
    pool: &PgPool,
    update: &AlertSettingsUpdate,
) -> Result<AlertSettings, DbError> {
    update.validate().map_err(DbError::Validation)?;

    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, AlertSettingsRow>(
        "SELECT threshold, email, webhook, enabled, updated_at \
         FROM alert_settings \
         WHERE id = 1 \
         FOR UPDATE",
    )
    .fetch_optional(&mut *tx)
    .await?
    .map(AlertSettings::from)
    .unwrap_or_default();

    let merged = update.apply(&current);

    let stored = sqlx::query_as::<_, AlertSettingsRow>(
        "INSERT INTO alert_settings (id, threshold, email, webhook, enabled, updated_at) \
         VALUES (1, $1, $2, $3, $4, NOW()) \
         ON CONFLICT (id) DO UPDATE SET \
             threshold = EXCLUDED.threshold, \
             email = EXCLUDED.email, \
             webhook = EXCLUDED.webhook, \
             enabled = EXCLUDED.enabled, \
             updated_at = NOW() \
         RETURNING threshold, email, webhook, enabled, updated_at",
    )
    .bind(merged.threshold)
    .bind(&merged.email)
    .bind(&merged.webhook)
    .bind(merged.enabled)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        threshold = stored.threshold,
        enabled = stored.enabled,
        "alert settings updated"
    );

    Ok(stored.into())
}
