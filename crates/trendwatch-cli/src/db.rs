use std::path::Path;

pub(crate) async fn run_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    trendwatch_db::health_check(pool).await?;
    println!("database: ok");
    Ok(())
}

pub(crate) async fn run_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = trendwatch_db::run_migrations(pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Validate the watchlist file and upsert it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if
/// the upsert transaction fails. Nothing is written in either case.
pub(crate) async fn run_seed(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let watchlist = trendwatch_core::load_watchlist(path)?;
    let summary = trendwatch_db::seed_watchlist(pool, &watchlist).await?;
    println!(
        "seeded {}: keywords +{} ~{}, sources +{} ~{}",
        path.display(),
        summary.keywords_inserted,
        summary.keywords_updated,
        summary.sources_inserted,
        summary.sources_updated
    );
    Ok(())
}
