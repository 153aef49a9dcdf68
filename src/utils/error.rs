use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Proxy is required.")]
    MissingProxy,

    #[error("Invalid proxy for scheme '{scheme}': {message}")]
    InvalidProxy { scheme: String, message: String },

    #[error("Failed to retrieve {url} after {attempts} attempts")]
    FetchExhausted { url: String, attempts: u32 },

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Notification error: {notifier}: {message}")]
    Notification { notifier: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("{}", err))
    }
}

impl AppError {
    /// True for failures caused by the caller's input rather than by the session.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingProxy | AppError::InvalidProxy { .. } | AppError::Validation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
