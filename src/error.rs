use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Request to {endpoint} failed: {details}")]
    Transport { endpoint: String, details: String },

    #[error("Endpoint {endpoint} answered with status {status}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Invalid period axis: {0}")]
    InvalidAxis(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DashboardError {
    /// Fetch failures are recovered locally by the fetcher; everything else is a programming
    /// or configuration fault.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::Decode(_)
        )
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.path().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        match err.status() {
            Some(status) => Self::HttpStatus {
                endpoint,
                status: status.as_u16(),
            },
            None => Self::Transport {
                endpoint,
                details: err.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
