use crate::traits::{BackendDirectory, SearchBackend};
use crate::{ApiCatalog, HealthStatus, Query, SearchError, SearchResponse};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpSearchBackend {
    base_url: Url,
    client: Client,
    timeout: Option<Duration>,
}

impl HttpSearchBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, SearchError> {
        let mut base_url = Url::parse(base_url.trim())?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|error| SearchError::Transport(error.to_string()))?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SearchError> {
        Ok(self.base_url.join(path)?)
    }

    fn map_error(&self, error: reqwest::Error) -> SearchError {
        match SearchError::from(error) {
            SearchError::Timeout(_) => SearchError::Timeout(self.timeout.unwrap_or_default()),
            other => other,
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, SearchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|error| self.map_error(error))?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SearchError> {
        let url = self.endpoint(path)?;
        debug!(%url, "GET backend");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| self.map_error(error))?;

        self.decode(response).await
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn generate(&self, query: &Query) -> Result<SearchResponse, SearchError> {
        let url = self.endpoint("generate")?;
        debug!(%url, query = %query, "POST backend");

        // `.json` sets `Content-Type: application/json`.
        let response = self
            .client
            .post(url)
            .json(&query.to_request())
            .send()
            .await
            .map_err(|error| self.map_error(error))?;

        self.decode(response).await
    }
}

#[async_trait]
impl BackendDirectory for HttpSearchBackend {
    async fn health(&self) -> Result<HealthStatus, SearchError> {
        self.get_json("").await
    }

    async fn catalog(&self) -> Result<ApiCatalog, SearchError> {
        self.get_json("docs").await
    }
}
