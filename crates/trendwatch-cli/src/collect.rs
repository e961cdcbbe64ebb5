//! Collection and analysis command handlers.
//!
//! Both go through the same pipeline entry points as the server's scheduler
//! and manual trigger, recorded with the `cli` trigger.

use chrono::Utc;
use trendwatch_collectors::{build_client, CollectorSettings, Registry};
use trendwatch_pipeline::{
    analyze_and_notify, analyze_trends, run_collection_audited, run_cycle, Notifier, PgStore,
    TrendReport, TrendStore, Trigger,
};

fn notifier(settings: &CollectorSettings) -> anyhow::Result<Notifier> {
    Ok(Notifier::new(build_client(
        settings.timeout_secs,
        &settings.user_agent,
    )?))
}

/// Run one collection, optionally followed by analysis and alert delivery.
///
/// # Errors
///
/// Returns an error if the active keywords or sources cannot be loaded, or
/// the HTTP client cannot be built. Per-source failures are only counted.
pub(crate) async fn run_collect(
    pool: sqlx::PgPool,
    config: &trendwatch_core::AppConfig,
    dry_run: bool,
    analyze: bool,
) -> anyhow::Result<()> {
    let store = PgStore::new(pool);

    if dry_run {
        return print_plan(&store).await;
    }

    let settings = CollectorSettings::from_app_config(config);
    let registry = Registry::new(&settings)?;
    tracing::info!(analyze, timeout_secs = settings.timeout_secs, "cli: starting collection");

    if analyze {
        let report = run_cycle(&store, &registry, &notifier(&settings)?, Trigger::Cli).await?;
        println!(
            "collected: {} source(s) ok, {} failed, {} item(s) written; {} alert(s)",
            report.summary.successful,
            report.summary.failed,
            report.summary.items_written,
            report.alerts.len()
        );
        return Ok(());
    }

    let summary = run_collection_audited(&store, &registry, Trigger::Cli).await?;
    println!(
        "collected: {} source(s) ok, {} failed, {} item(s) written",
        summary.successful, summary.failed, summary.items_written
    );
    Ok(())
}

async fn print_plan(store: &PgStore) -> anyhow::Result<()> {
    let keywords = store.active_keywords().await?;
    let sources = store.active_sources().await?;
    let names: Vec<&str> = keywords.iter().map(|k| k.name.as_str()).collect();

    println!(
        "dry-run: would collect {} keyword(s) [{}] from {} source(s)",
        keywords.len(),
        names.join(", "),
        sources.len()
    );
    for source in &sources {
        match source.kind() {
            Some(kind) => println!("  {:<10} {}", kind.as_str(), source.name),
            None => println!(
                "  {:<10} {} (unsupported type '{}', will be counted failed)",
                "?", source.name, source.source_type
            ),
        }
    }
    Ok(())
}

/// Report the current trend windows and any surges.
///
/// # Errors
///
/// Returns an error if items or settings cannot be read.
pub(crate) async fn run_analyze(
    pool: sqlx::PgPool,
    config: &trendwatch_core::AppConfig,
    notify: bool,
    json: bool,
) -> anyhow::Result<()> {
    let store = PgStore::new(pool);
    let now = Utc::now();

    let report = if notify {
        let settings = CollectorSettings::from_app_config(config);
        let (report, dispatch) = analyze_and_notify(&store, &notifier(&settings)?, now).await?;
        println!(
            "notified: {} email(s), {} webhook(s), {} failure(s)",
            dispatch.emails_sent, dispatch.webhooks_sent, dispatch.failures
        );
        report
    } else {
        analyze_trends(&store, now).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &TrendReport) {
    println!(
        "trend windows at {} (threshold {}%, alerts {})",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        report.settings.threshold,
        if report.settings.enabled { "on" } else { "off" }
    );
    println!("{:<24} {:>8} {:>8}", "keyword", "recent", "previous");
    for (keyword, recent) in &report.windows.recent {
        let previous = report.windows.previous.get(keyword).map_or(0, |w| w.count);
        println!("{keyword:<24} {:>8} {previous:>8}", recent.count);
    }
    if report.alerts.is_empty() {
        println!("no surges");
        return;
    }
    for alert in &report.alerts {
        println!("{}", trendwatch_pipeline::alert_message(alert));
    }
}
