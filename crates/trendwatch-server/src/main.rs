mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use trendwatch_collectors::{build_client, CollectorSettings, Registry};
use trendwatch_pipeline::{Notifier, PgStore};

use crate::{
    api::{build_app, AppState},
    scheduler::CycleDeps,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = trendwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendwatch_db::PoolConfig::from_app_config(&config);
    let pool = trendwatch_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = trendwatch_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let settings = CollectorSettings::from_app_config(&config);
    let store = Arc::new(PgStore::new(pool.clone()));
    let collector = Arc::new(Registry::new(&settings)?);
    let notifier = Notifier::new(build_client(settings.timeout_secs, &settings.user_agent)?);

    let deps = Arc::new(CycleDeps {
        store: store.clone(),
        collector: collector.clone(),
        notifier,
    });
    let _scheduler =
        scheduler::build_scheduler(deps, &config.collect_cron, &config.timezone).await?;

    let app = build_app(AppState {
        pool,
        store,
        collector,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "trendwatch server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
