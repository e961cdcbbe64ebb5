//! Alert delivery over the configured email and webhook channels.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use trendwatch_core::{Alert, AlertSettings};

use crate::error::NotifyError;

/// Human-readable text for one alert.
#[must_use]
pub fn alert_message(alert: &Alert) -> String {
    format!(
        "[Trend surge] Mentions of keyword '{}' rose {}% versus the previous period. (Main sources: {})",
        alert.keyword,
        alert.percentage_change,
        alert.sources.join(", ")
    )
}

/// Email delivery. Integrators supply a real transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Default [`Mailer`]: writes the message to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(to, subject, body, "email alert (log mailer)");
        Ok(())
    }
}

/// Channel outcomes across one dispatch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub emails_sent: usize,
    pub webhooks_sent: usize,
    pub failures: usize,
}

pub struct Notifier {
    client: Client,
    mailer: Arc<dyn Mailer>,
}

impl Notifier {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_mailer(client, Arc::new(LogMailer))
    }

    #[must_use]
    pub fn with_mailer(client: Client, mailer: Arc<dyn Mailer>) -> Self {
        Self { client, mailer }
    }

    /// Send every alert to every configured channel.
    ///
    /// Channel failures are logged and counted; they never stop delivery of
    /// the remaining channels or alerts.
    pub async fn dispatch(&self, alerts: &[Alert], settings: &AlertSettings) -> DispatchReport {
        let mut report = DispatchReport::default();
        for alert in alerts {
            let message = alert_message(alert);

            if let Some(email) = settings.email.as_deref().filter(|e| !e.is_empty()) {
                let subject = format!("[Trend surge] {}", alert.keyword);
                match self.mailer.send(email, &subject, &message).await {
                    Ok(()) => report.emails_sent += 1,
                    Err(e) => {
                        report.failures += 1;
                        tracing::error!(keyword = %alert.keyword, error = %e, "email alert failed");
                    }
                }
            }

            if let Some(webhook) = settings.webhook.as_deref().filter(|w| !w.is_empty()) {
                match self.post_webhook(webhook, &message).await {
                    Ok(()) => report.webhooks_sent += 1,
                    Err(e) => {
                        report.failures += 1;
                        tracing::error!(keyword = %alert.keyword, error = %e, "webhook alert failed");
                    }
                }
            }
        }
        report
    }

    async fn post_webhook(&self, url: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(url)
            .json(&json!({ "text": message }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::WebhookStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
