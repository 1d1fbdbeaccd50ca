use crate::{SearchError, SearchResponse};

/// Phase of the current submission. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Loading,
    Success(SearchResponse),
    Error(String),
}

impl LifecycleState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn response(&self) -> Option<&SearchResponse> {
        match self {
            Self::Success(response) => Some(response),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }

    pub fn resolved(outcome: Result<SearchResponse, SearchError>) -> Self {
        match outcome {
            Ok(response) => Self::Success(response),
            Err(error) => Self::Error(error.user_message()),
        }
    }
}
