use thiserror::Error;

/// Failure of the backing store, whichever implementation is in use.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] trendwatch_db::DbError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading the active keywords or sources failed; nothing was collected.
    #[error("failed to load collection config: {0}")]
    ConfigFetch(#[source] StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned HTTP {status}")]
    WebhookStatus { status: u16 },

    #[error("mail delivery failed: {0}")]
    Mail(String),
}
