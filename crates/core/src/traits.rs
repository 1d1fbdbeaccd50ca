use crate::{ApiCatalog, HealthStatus, Query, SearchError, SearchResponse};
use async_trait::async_trait;

#[async_trait]
pub trait SearchBackend {
    async fn generate(&self, query: &Query) -> Result<SearchResponse, SearchError>;
}

#[async_trait]
pub trait BackendDirectory {
    async fn health(&self) -> Result<HealthStatus, SearchError>;

    async fn catalog(&self) -> Result<ApiCatalog, SearchError>;
}
