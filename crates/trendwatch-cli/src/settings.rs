use clap::Subcommand;
use trendwatch_core::{AlertSettings, AlertSettingsUpdate};

#[derive(Debug, Subcommand)]
pub(crate) enum SettingsCommands {
    Show,
    /// Change one or more fields; unspecified fields keep their value
    Set {
        #[arg(long)]
        threshold: Option<i32>,

        /// Recipient address, or an empty string to clear
        #[arg(long)]
        email: Option<String>,

        /// Webhook URL, or an empty string to clear
        #[arg(long)]
        webhook: Option<String>,

        #[arg(long)]
        enabled: Option<bool>,
    },
}

impl SettingsCommands {
    /// The partial write described by a `set` invocation.
    pub(crate) fn to_update(&self) -> Option<AlertSettingsUpdate> {
        match self {
            SettingsCommands::Show => None,
            SettingsCommands::Set {
                threshold,
                email,
                webhook,
                enabled,
            } => Some(AlertSettingsUpdate {
                threshold: *threshold,
                email: email.clone(),
                webhook: webhook.clone(),
                enabled: *enabled,
            }),
        }
    }
}

pub(crate) async fn run_settings(
    pool: &sqlx::PgPool,
    command: SettingsCommands,
) -> anyhow::Result<()> {
    let settings = match command.to_update() {
        None => trendwatch_db::get_alert_settings(pool).await?,
        Some(update) if update == AlertSettingsUpdate::default() => {
            anyhow::bail!("settings set: pass at least one of --threshold, --email, --webhook, --enabled");
        }
        Some(update) => trendwatch_db::set_alert_settings(pool, &update).await?,
    };
    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &AlertSettings) {
    println!("threshold: {}%", settings.threshold);
    println!("enabled:   {}", settings.enabled);
    println!("email:     {}", settings.email.as_deref().unwrap_or("-"));
    println!("webhook:   {}", settings.webhook.as_deref().unwrap_or("-"));
    if let Some(updated_at) = settings.updated_at {
        println!("updated:   {}", updated_at.to_rfc3339());
    }
}
