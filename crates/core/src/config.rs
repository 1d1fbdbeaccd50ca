use crate::backends::HttpSearchBackend;
use crate::SearchError;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl ClientConfig {
    /// A timeout of zero seconds means wait indefinitely.
    pub fn new(backend_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            backend_url: backend_url.into(),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }

    pub fn build_backend(&self) -> Result<HttpSearchBackend, SearchError> {
        HttpSearchBackend::new(&self.backend_url, self.timeout)
    }
}
