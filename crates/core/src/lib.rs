pub mod backends;
pub mod config;
pub mod controller;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod traits;
pub mod view;

pub use backends::HttpSearchBackend;
pub use config::{ClientConfig, DEFAULT_BACKEND_URL, DEFAULT_TIMEOUT_SECS};
pub use controller::{QueryLifecycleController, Submission, CANCELLED_MESSAGE};
pub use error::{SearchError, BACKEND_UNREACHABLE_MESSAGE, EMPTY_QUERY_MESSAGE};
pub use lifecycle::LifecycleState;
pub use models::{
    ApiCatalog, Document, DocumentId, DocumentInfo, EndpointInfo, HealthStatus, Query,
    QueryRequest, SearchResponse,
};
pub use traits::{BackendDirectory, SearchBackend};
pub use view::{DocumentCard, SearchView};
