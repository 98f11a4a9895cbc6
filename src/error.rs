use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Station API error: {0}")]
    StationApi(String),

    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure came from talking to the API rather than from local setup.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::StationApi(_) | Self::Http { .. } | Self::Decode(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
