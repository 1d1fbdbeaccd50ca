use crate::traits::SearchBackend;
use crate::view::SearchView;
use crate::{LifecycleState, Query, SearchError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const CANCELLED_MESSAGE: &str = "Search was cancelled before the backend responded";

/// What a call to [`QueryLifecycleController::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A request was already in flight; nothing changed.
    Ignored,
    /// The query was blank and never reached the backend.
    Rejected,
    /// One request was issued and its outcome is now the current state.
    Resolved,
}

/// Drives one query at a time through Idle -> Loading -> Success | Error.
///
/// The state lives in a watch channel so renderers can observe every
/// transition, including the `Loading` phase while a request is outstanding.
pub struct QueryLifecycleController<B>
where
    B: SearchBackend,
{
    backend: B,
    state: watch::Sender<LifecycleState>,
    timeout: Option<Duration>,
}

impl<B> QueryLifecycleController<B>
where
    B: SearchBackend + Send + Sync,
{
    pub fn new(backend: B) -> Self {
        Self::with_timeout(backend, None)
    }

    pub fn with_timeout(backend: B, timeout: Option<Duration>) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            backend,
            state,
            timeout,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn current_state(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn view(&self) -> SearchView {
        SearchView::from_state(&self.state.borrow())
    }

    pub async fn submit(&self, raw_query: &str) -> Submission {
        let submission_id = Uuid::new_v4();
        let parsed = Query::parse(raw_query);

        // Test-and-set in one transition so two callers can never both start.
        let mut in_flight = false;
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                in_flight = true;
                return false;
            }
            *state = match &parsed {
                Ok(_) => LifecycleState::Loading,
                Err(error) => LifecycleState::Error(error.user_message()),
            };
            true
        });

        if in_flight {
            debug!(%submission_id, "submit ignored while a request is in flight");
            return Submission::Ignored;
        }

        let query = match parsed {
            Ok(query) => query,
            Err(error) => {
                warn!(%submission_id, %error, "query rejected before submission");
                return Submission::Rejected;
            }
        };

        debug!(%submission_id, query = %query, "state -> loading");
        let guard = LoadingGuard { state: &self.state };

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.backend.generate(&query))
                .await
                .unwrap_or_else(|_| Err(SearchError::Timeout(limit))),
            None => self.backend.generate(&query).await,
        };

        match &outcome {
            Ok(response) => info!(
                %submission_id,
                documents = response.relevant_docs.len(),
                "search resolved"
            ),
            Err(error) => warn!(%submission_id, %error, "search failed"),
        }

        guard.resolve(LifecycleState::resolved(outcome));
        Submission::Resolved
    }
}

/// Clears `Loading` exactly once, even when the submit future is dropped
/// before the backend answers.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<LifecycleState>,
}

impl LoadingGuard<'_> {
    fn resolve(self, next: LifecycleState) {
        debug!(state = next.label(), "state resolved");
        self.state.send_replace(next);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = LifecycleState::Error(CANCELLED_MESSAGE.to_string());
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, DocumentId, SearchResponse, EMPTY_QUERY_MESSAGE};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    #[derive(Clone)]
    enum Reply {
        Body(SearchResponse),
        Status(u16),
        Transport(String),
        Pending,
    }

    struct FakeBackend {
        calls: Mutex<Vec<String>>,
        reply: Reply,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn replying(reply: Reply) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
                gate: None,
            }
        }

        fn gated(reply: Reply, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::replying(reply)
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn generate(&self, query: &Query) -> Result<SearchResponse, SearchError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push(query.as_str().to_string());

            if let Some(gate) = &self.gate {
                gate.notified().await;
            }

            match self.reply.clone() {
                Reply::Body(response) => Ok(response),
                Reply::Status(status) => Err(SearchError::HttpStatus { status }),
                Reply::Transport(message) => Err(SearchError::Transport(message)),
                Reply::Pending => std::future::pending().await,
            }
        }
    }

    fn empty_response(summary: &str) -> SearchResponse {
        SearchResponse {
            summary: summary.to_string(),
            relevant_docs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_a_request() {
        let controller =
            QueryLifecycleController::new(FakeBackend::replying(Reply::Body(empty_response("S"))));

        for raw in ["", "  ", "\n\t"] {
            assert_eq!(controller.submit(raw).await, Submission::Rejected);
            assert_eq!(
                controller.current_state(),
                LifecycleState::Error(EMPTY_QUERY_MESSAGE.to_string())
            );
        }
        assert!(controller.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn trimmed_query_is_sent_exactly_once() {
        let controller =
            QueryLifecycleController::new(FakeBackend::replying(Reply::Body(empty_response("S"))));

        assert_eq!(controller.submit("  contract law \n").await, Submission::Resolved);
        assert_eq!(controller.backend().calls(), vec!["contract law".to_string()]);
    }

    #[tokio::test]
    async fn not_found_becomes_http_error() {
        let controller = QueryLifecycleController::new(FakeBackend::replying(Reply::Status(404)));

        controller.submit("contract").await;
        assert_eq!(
            controller.current_state(),
            LifecycleState::Error("HTTP error! status: 404".to_string())
        );
    }

    #[tokio::test]
    async fn empty_success_body_becomes_success() {
        let controller =
            QueryLifecycleController::new(FakeBackend::replying(Reply::Body(empty_response("S"))));

        controller.submit("anything").await;
        assert_eq!(
            controller.current_state(),
            LifecycleState::Success(empty_response("S"))
        );
    }

    #[tokio::test]
    async fn transport_failure_without_message_uses_fallback() {
        let controller =
            QueryLifecycleController::new(FakeBackend::replying(Reply::Transport(String::new())));

        controller.submit("contract").await;
        assert_eq!(
            controller.current_state().error_message(),
            Some(crate::BACKEND_UNREACHABLE_MESSAGE)
        );
    }

    #[tokio::test]
    async fn contract_law_scenario_exposes_exact_response() {
        let expected = SearchResponse {
            summary: "Contracts require offer, acceptance, consideration.".to_string(),
            relevant_docs: vec![Document {
                doc_id: DocumentId::new("D1"),
                title: "Contract Basics".to_string(),
                excerpt: "...".to_string(),
                relevance_score: 0.92,
            }],
        };
        let controller =
            QueryLifecycleController::new(FakeBackend::replying(Reply::Body(expected.clone())));

        assert_eq!(controller.submit("  ").await, Submission::Rejected);
        assert_eq!(
            controller.current_state().error_message(),
            Some(EMPTY_QUERY_MESSAGE)
        );

        assert_eq!(controller.submit("contract law").await, Submission::Resolved);
        assert_eq!(controller.current_state(), LifecycleState::Success(expected));
    }

    #[tokio::test]
    async fn unresolved_request_without_timeout_stays_loading() {
        let controller = Arc::new(QueryLifecycleController::new(FakeBackend::replying(
            Reply::Pending,
        )));
        let mut states = controller.subscribe();

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("contract").await }
        });

        states
            .wait_for(LifecycleState::is_loading)
            .await
            .expect("controller alive");
        tokio::task::yield_now().await;

        assert!(controller.current_state().is_loading());
        assert!(!task.is_finished());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn unresolved_request_with_timeout_becomes_error() {
        let controller = QueryLifecycleController::with_timeout(
            FakeBackend::replying(Reply::Pending),
            Some(Duration::from_secs(30)),
        );

        assert_eq!(controller.submit("contract").await, Submission::Resolved);
        assert_eq!(
            controller.current_state(),
            LifecycleState::Error("Request timed out after 30s".to_string())
        );
    }

    #[tokio::test]
    async fn submit_while_loading_is_ignored() {
        let gate = Arc::new(Notify::new());
        let controller = Arc::new(QueryLifecycleController::new(FakeBackend::gated(
            Reply::Body(empty_response("first")),
            gate.clone(),
        )));
        let mut states = controller.subscribe();

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("first").await }
        });
        states
            .wait_for(LifecycleState::is_loading)
            .await
            .expect("controller alive");

        assert_eq!(controller.submit("second").await, Submission::Ignored);
        assert!(!controller.view().submit_enabled);

        gate.notify_one();
        assert_eq!(first.await.expect("join"), Submission::Resolved);
        assert_eq!(controller.backend().calls(), vec!["first".to_string()]);
        assert_eq!(
            controller.current_state(),
            LifecycleState::Success(empty_response("first"))
        );
    }

    #[tokio::test]
    async fn new_submission_clears_previous_result() {
        let gate = Arc::new(Notify::new());
        let controller = Arc::new(QueryLifecycleController::new(FakeBackend::gated(
            Reply::Body(empty_response("S")),
            gate.clone(),
        )));

        gate.notify_one();
        controller.submit("first").await;
        assert!(controller.current_state().response().is_some());

        let mut states = controller.subscribe();
        let second = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("second").await }
        });

        states.changed().await.expect("controller alive");
        let observed = states.borrow_and_update().clone();
        assert_eq!(observed, LifecycleState::Loading);
        let view = controller.view();
        assert!(view.summary.is_none());
        assert!(view.documents.is_empty());
        assert!(view.error_banner.is_none());

        gate.notify_one();
        assert_eq!(second.await.expect("join"), Submission::Resolved);
        assert!(controller.current_state().response().is_some());
    }

    #[tokio::test]
    async fn retry_after_error_is_always_allowed() {
        let controller = QueryLifecycleController::new(FakeBackend::replying(Reply::Status(500)));

        controller.submit("contract").await;
        assert_eq!(controller.submit("contract").await, Submission::Resolved);
        assert_eq!(controller.backend().calls().len(), 2);
    }

    #[tokio::test]
    async fn dropped_submission_does_not_leave_controller_loading() {
        let controller = Arc::new(QueryLifecycleController::new(FakeBackend::replying(
            Reply::Pending,
        )));
        let mut states = controller.subscribe();

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit("contract").await }
        });
        states
            .wait_for(LifecycleState::is_loading)
            .await
            .expect("controller alive");

        task.abort();
        assert!(task.await.expect_err("task aborted").is_cancelled());
        assert_eq!(
            controller.current_state().error_message(),
            Some(CANCELLED_MESSAGE)
        );
        assert_eq!(controller.submit("  ").await, Submission::Rejected);
    }
}
