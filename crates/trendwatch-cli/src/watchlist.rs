use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub(crate) enum KeywordCommands {
    List,
    Enable { name: String },
    Disable { name: String },
}

pub(crate) async fn run_keywords(
    pool: &sqlx::PgPool,
    command: KeywordCommands,
) -> anyhow::Result<()> {
    let (name, active) = match command {
        KeywordCommands::List => {
            for row in trendwatch_db::list_keywords(pool).await? {
                let state = if row.active { "active" } else { "inactive" };
                println!("{:<24} {:<8} {state}", row.name, row.category);
            }
            return Ok(());
        }
        KeywordCommands::Enable { name } => (name, true),
        KeywordCommands::Disable { name } => (name, false),
    };

    match trendwatch_db::set_keyword_active(pool, &name, active).await {
        Ok(()) => {
            println!(
                "keyword '{name}' {}",
                if active { "enabled" } else { "disabled" }
            );
            Ok(())
        }
        Err(trendwatch_db::DbError::NotFound) => anyhow::bail!("no keyword named '{name}'"),
        Err(e) => Err(e.into()),
    }
}

pub(crate) async fn run_sources(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for row in trendwatch_db::list_sources(pool).await? {
        let state = if row.active { "active" } else { "inactive" };
        println!(
            "{:<20} {:<10} {state:<8} {}",
            row.name, row.source_type, row.url
        );
    }
    Ok(())
}

pub(crate) async fn run_items(
    pool: &sqlx::PgPool,
    keyword: Option<&str>,
    limit: i64,
) -> anyhow::Result<()> {
    let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
    let rows = trendwatch_db::list_recent_items(pool, keyword, limit.clamp(1, 200)).await?;
    if rows.is_empty() {
        println!("no items");
        return Ok(());
    }
    for row in rows {
        println!(
            "{}  {:<12} {:<14} {}",
            row.timestamp.format("%Y-%m-%d %H:%M"),
            row.keyword_name,
            row.source_name,
            row.title
        );
        println!("    {}", row.url);
    }
    Ok(())
}
