mod collect;
mod db;
mod settings;
mod watchlist;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::settings::SettingsCommands;
use crate::watchlist::KeywordCommands;

#[derive(Debug, Parser)]
#[command(name = "trendwatch-cli")]
#[command(about = "Keyword trend collection and surge alerts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Collect every active keyword from every active source
    Collect {
        /// List the keyword and source pairs without fetching anything
        #[arg(long)]
        dry_run: bool,

        /// Run trend analysis and send alerts after collecting
        #[arg(long)]
        analyze: bool,
    },
    /// Compare the last two windows and report surges
    Analyze {
        /// Deliver alerts to the configured email and webhook
        #[arg(long)]
        notify: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recently collected items
    Items {
        #[arg(long)]
        keyword: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Inspect or toggle tracked keywords
    Keywords {
        #[command(subcommand)]
        command: KeywordCommands,
    },
    /// List configured sources
    Sources,
    /// Read or change alert settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
    /// Upsert keywords and sources from the watchlist YAML
    Seed {
        /// Override `TRENDWATCH_WATCHLIST_PATH`
        #[arg(long)]
        path: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("trendwatch-cli: run with --help to list commands");
        return Ok(());
    };

    let config = trendwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendwatch_db::PoolConfig::from_app_config(&config);
    let pool = trendwatch_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_ping(&pool).await,
            DbCommands::Migrate => db::run_migrate(&pool).await,
            DbCommands::Seed { path } => {
                let path = path.unwrap_or_else(|| config.watchlist_path.clone());
                db::run_seed(&pool, &path).await
            }
        },
        Commands::Collect { dry_run, analyze } => {
            collect::run_collect(pool, &config, dry_run, analyze).await
        }
        Commands::Analyze { notify, json } => {
            collect::run_analyze(pool, &config, notify, json).await
        }
        Commands::Items { keyword, limit } => {
            watchlist::run_items(&pool, keyword.as_deref(), limit).await
        }
        Commands::Keywords { command } => watchlist::run_keywords(&pool, command).await,
        Commands::Sources => watchlist::run_sources(&pool).await,
        Commands::Settings { command } => settings::run_settings(&pool, command).await,
    }
}

#[cfg(test)]
mod tests;
