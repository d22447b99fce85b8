use reqwest::StatusCode;
use thiserror::Error;

/// Application error types
///
/// The estimation core never produces these; they belong to the
/// collaborators around it (data loading, intake, advice, reports).
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Reference data could not be read or parsed
    #[error("Data load error: {0}")]
    DataLoad(String),
    /// Caller supplied a value outside the accepted range
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Upstream text-generation API error
    #[error("Upstream error ({status}): {message}")]
    UpstreamError { status: StatusCode, message: String },
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
    /// Upstream answered but produced no usable text
    #[error("Empty response from {0}")]
    EmptyResponse(String),
    /// Report could not be written
    #[error("Report error: {0}")]
    Report(String),
}

impl AppError {
    /// Short machine-readable name, used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "config_error",
            Self::DataLoad(_) => "data_load_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::UpstreamError { .. } => "upstream_error",
            Self::HttpRequest(_) => "http_request_error",
            Self::EmptyResponse(_) => "empty_response",
            Self::Report(_) => "report_error",
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::DataLoad(format!("JSON error: {}", err))
    }
}
