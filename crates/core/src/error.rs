use std::time::Duration;
use thiserror::Error;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search query";
pub const BACKEND_UNREACHABLE_MESSAGE: &str =
    "Failed to fetch response. Please ensure the backend is running.";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("query is empty")]
    Validation,

    #[error("backend returned status {status}")]
    HttpStatus { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {}", format_duration(.0))]
    Timeout(Duration),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl SearchError {
    /// Message shown to the user when a submission ends in this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation => EMPTY_QUERY_MESSAGE.to_string(),
            Self::HttpStatus { status } => format!("HTTP error! status: {status}"),
            Self::Transport(message) if message.trim().is_empty() => {
                BACKEND_UNREACHABLE_MESSAGE.to_string()
            }
            Self::Transport(message) => message.clone(),
            Self::Timeout(after) => format!("Request timed out after {}", format_duration(after)),
            Self::Url(error) => format!("Invalid backend URL: {error}"),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout(Duration::ZERO);
        }
        if let Some(status) = error.status().filter(|_| error.is_status()) {
            return Self::HttpStatus {
                status: status.as_u16(),
            };
        }
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(error: serde_json::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

fn format_duration(duration: &Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;
