use crate::{Document, LifecycleState};

pub const SUBMIT_LABEL: &str = "Search";
pub const SUBMITTING_LABEL: &str = "Searching...";

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCard {
    pub doc_id: String,
    pub title: String,
    pub excerpt: String,
    pub relevance_label: String,
}

impl From<&Document> for DocumentCard {
    fn from(document: &Document) -> Self {
        Self {
            doc_id: document.doc_id.to_string(),
            title: document.title.clone(),
            excerpt: document.excerpt.clone(),
            relevance_label: relevance_label(document.relevance_score),
        }
    }
}

/// Everything a renderer needs to draw the search form and its results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchView {
    pub submit_enabled: bool,
    pub submit_label: &'static str,
    pub error_banner: Option<String>,
    pub summary: Option<String>,
    pub documents: Vec<DocumentCard>,
    pub empty_results: bool,
}

impl SearchView {
    pub fn from_state(state: &LifecycleState) -> Self {
        let idle = Self {
            submit_enabled: true,
            submit_label: SUBMIT_LABEL,
            error_banner: None,
            summary: None,
            documents: Vec::new(),
            empty_results: false,
        };

        match state {
            LifecycleState::Idle => idle,
            LifecycleState::Loading => Self {
                submit_enabled: false,
                submit_label: SUBMITTING_LABEL,
                ..idle
            },
            LifecycleState::Error(message) => Self {
                error_banner: Some(message.clone()),
                ..idle
            },
            LifecycleState::Success(response) => Self {
                summary: Some(response.summary.clone()),
                documents: response.relevant_docs.iter().map(DocumentCard::from).collect(),
                empty_results: response.relevant_docs.is_empty(),
                ..idle
            },
        }
    }
}

fn relevance_label(score: f64) -> String {
    let clamped = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
    format!("{:.0}%", clamped * 100.0)
}
