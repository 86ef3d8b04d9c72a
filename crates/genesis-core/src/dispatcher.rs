//! Send-message cycle

use genesis_api::{Backend, ChatErrorKind, ChatRequest, RunState};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{message::Message, probe::ConnectivityFlag, store::ConversationStore};

/// Why a send was turned away before reaching the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty after trimming
    EmptyInput,
    /// Another send is still waiting on the backend
    AlreadySending,
}

/// What a call to [`MessageDispatcher::send`] did
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Nothing was sent and the store is untouched
    Rejected(RejectReason),
    /// The backend answered; the run is now the store's `last_run`
    Answered(Arc<RunState>),
    /// The call failed; an error message was appended and `last_run` kept
    Failed(ChatErrorKind),
}

/// Clears the in-flight flag on every exit path, including cancellation.
struct SendingGuard<'a>(&'a AtomicBool);

impl<'a> SendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs one user turn against the backend and records the result.
///
/// Clones share the in-flight flag, so a second send from any clone is
/// rejected while the first is pending.
#[derive(Clone)]
pub struct MessageDispatcher {
    store: ConversationStore,
    backend: Arc<dyn Backend>,
    connectivity: ConnectivityFlag,
    sending: Arc<AtomicBool>,
    user_id: Option<String>,
}

impl MessageDispatcher {
    pub fn new(
        store: ConversationStore,
        backend: Arc<dyn Backend>,
        connectivity: ConnectivityFlag,
    ) -> Self {
        Self {
            store,
            backend,
            connectivity,
            sending: Arc::new(AtomicBool::new(false)),
            user_id: None,
        }
    }

    /// Attach a user id to every chat request
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Whether a send is waiting on the backend
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Send `input` as the next user turn.
    ///
    /// Appends the user message, then exactly one of: an assistant message
    /// (with the run set as `last_run` first) or a system error message.
    pub async fn send(&self, input: &str) -> SendOutcome {
        if input.trim().is_empty() {
            return SendOutcome::Rejected(RejectReason::EmptyInput);
        }
        let Some(_guard) = SendingGuard::acquire(&self.sending) else {
            tracing::debug!("Send ignored: previous message still in flight");
            return SendOutcome::Rejected(RejectReason::AlreadySending);
        };

        self.store.add_message(Message::user(input));

        let request = ChatRequest::new(input).with_user_id(self.user_id.clone());
        match self.backend.chat(&request).await {
            Ok(run) => {
                let run = Arc::new(run);
                self.store.set_last_run(Arc::clone(&run));
                self.connectivity.set_unreachable(false);
                self.store.add_message(Message::assistant(Arc::clone(&run)));
                SendOutcome::Answered(run)
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!("Chat request failed ({:?}): {}", kind, e);
                if kind.is_unreachable() {
                    self.connectivity.set_unreachable(true);
                }
                self.store
                    .add_message(Message::error(kind.user_message(self.backend.base_url())));
                SendOutcome::Failed(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::probe::{ConnectivityProbe, Reachability};
    use crate::views::{DerivedViews, Relevance, ScoreBand, Stage, StageStatus, ViewPolicies};
    use async_trait::async_trait;
    use genesis_api::{CriticReview, Error, HealthStatus};
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    type Reply = Box<dyn Fn() -> genesis_api::Result<RunState> + Send + Sync>;

    /// A mock backend that returns canned replies in order.
    struct MockBackend {
        replies: Mutex<Vec<Reply>>,
        requests: Mutex<Vec<ChatRequest>>,
        chat_calls: AtomicU32,
        delay: Duration,
        healthy: AtomicBool,
    }

    impl MockBackend {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
                chat_calls: AtomicU32::new(0),
                delay: Duration::ZERO,
                healthy: AtomicBool::new(true),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn calls(&self) -> u32 {
            self.chat_calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        fn base_url(&self) -> &str {
            "http://localhost:8002"
        }

        async fn health(&self) -> genesis_api::Result<HealthStatus> {
            if self.healthy.load(Ordering::Relaxed) {
                Ok(HealthStatus::default())
            } else {
                Err(Error::status(503, ""))
            }
        }

        async fn chat(&self, request: &ChatRequest) -> genesis_api::Result<RunState> {
            self.chat_calls.fetch_add(1, Ordering::Relaxed);
            self.requests.lock().push(request.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let reply = {
                let mut replies = self.replies.lock();
                if replies.is_empty() {
                    None
                } else {
                    Some(replies.remove(0))
                }
            };
            match reply {
                Some(reply) => reply(),
                None => Ok(RunState::new("done")),
            }
        }
    }

    fn ok(run: RunState) -> Reply {
        Box::new(move || Ok(run.clone()))
    }

    fn fail(status: u16, body: &'static str) -> Reply {
        Box::new(move || Err(Error::status(status, body)))
    }

    fn dispatcher_with(backend: MockBackend) -> (MessageDispatcher, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let dispatcher = MessageDispatcher::new(
            ConversationStore::new(),
            backend.clone(),
            ConnectivityFlag::new(),
        );
        (dispatcher, backend)
    }

    fn docker_response() -> RunState {
        serde_json::from_value(serde_json::json!({
            "final_response": "Containers bundle an application with its dependencies.",
            "rag_context": {
                "max_similarity": 0.82,
                "results_count": 2,
                "results": [
                    {"category": "docker", "content": "Docker containers are...", "similarity": 0.82},
                    {"category": "docker", "content": "Images are layered...", "similarity": 0.55}
                ]
            },
            "critic_review": {"score": 0.9}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_docker_scenario_end_to_end() {
        let (dispatcher, _backend) = dispatcher_with(MockBackend::new(vec![ok(docker_response())]));

        let outcome = dispatcher.send("Docker containers").await;
        assert!(matches!(outcome, SendOutcome::Answered(_)));

        let snapshot = dispatcher.store().snapshot();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[0].role, Role::User);
        assert_eq!(snapshot.messages[0].text, "Docker containers");
        let assistant = &snapshot.messages[1];
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(
            assistant.text,
            "Containers bundle an application with its dependencies."
        );
        // The message and the store share one captured run
        assert!(Arc::ptr_eq(
            assistant.raw_response.as_ref().unwrap(),
            snapshot.last_run.as_ref().unwrap()
        ));

        let views = DerivedViews::from_snapshot(&snapshot, &ViewPolicies::default());
        for stage in [Stage::Retrieval, Stage::Reasoning] {
            let view = views.pipeline.stage(stage);
            assert_eq!(view.status, StageStatus::Active);
            assert_eq!(view.band, ScoreBand::Excellent);
            assert_eq!(view.display_score(), "82%");
        }
        for stage in [Stage::Critique, Stage::Improvement] {
            let view = views.pipeline.stage(stage);
            assert_eq!(view.status, StageStatus::Active);
            assert_eq!(view.band, ScoreBand::Excellent);
            assert_eq!(view.display_score(), "90%");
        }

        assert_eq!(views.retrieval.items.len(), 2);
        assert_eq!(views.retrieval.items[0].relevance, Relevance::High);
        assert_eq!(views.retrieval.items[0].relevance.label(), "High relevance");
        assert_eq!(views.retrieval.items[1].relevance, Relevance::Medium);
        assert_eq!(views.retrieval.items[1].relevance.label(), "Medium relevance");
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_side_effects() {
        let (dispatcher, backend) = dispatcher_with(MockBackend::new(vec![]));

        assert_eq!(
            dispatcher.send("   \n\t").await,
            SendOutcome::Rejected(RejectReason::EmptyInput)
        );
        assert_eq!(backend.calls(), 0);
        assert!(dispatcher.store().snapshot().messages.is_empty());
    }

    #[tokio::test]
    async fn test_double_submit_sends_once() {
        let (dispatcher, backend) = dispatcher_with(
            MockBackend::new(vec![ok(RunState::new("first"))])
                .with_delay(Duration::from_millis(50)),
        );

        let (first, second) = tokio::join!(dispatcher.send("hello"), dispatcher.send("hello"));

        assert!(matches!(first, SendOutcome::Answered(_)));
        assert_eq!(second, SendOutcome::Rejected(RejectReason::AlreadySending));
        assert_eq!(backend.calls(), 1);

        let snapshot = dispatcher.store().snapshot();
        let users = snapshot
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        assert_eq!(users, 1);
        assert_eq!(snapshot.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_sending_flag_tracks_in_flight_call() {
        let (dispatcher, _backend) = dispatcher_with(
            MockBackend::new(vec![]).with_delay(Duration::from_millis(50)),
        );
        assert!(!dispatcher.is_sending());

        let observer = dispatcher.clone();
        let (_, seen_while_pending) = tokio::join!(dispatcher.send("hi"), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            observer.is_sending()
        });

        assert!(seen_while_pending);
        assert!(!dispatcher.is_sending());
    }

    #[tokio::test]
    async fn test_failure_keeps_last_run_and_adds_one_error() {
        let (dispatcher, _backend) = dispatcher_with(MockBackend::new(vec![
            ok(docker_response()),
            fail(500, r#"{"detail": "critic exploded"}"#),
        ]));

        dispatcher.send("Docker containers").await;
        let before = dispatcher.store().snapshot();
        assert_eq!(before.messages.len(), 2);

        let outcome = dispatcher.send("Kubernetes pods").await;
        assert_eq!(
            outcome,
            SendOutcome::Failed(ChatErrorKind::ServerError(Some("critic exploded".into())))
        );

        let after = dispatcher.store().snapshot();
        assert_eq!(after.messages.len(), before.messages.len() + 2);
        assert!(Arc::ptr_eq(
            after.last_run.as_ref().unwrap(),
            before.last_run.as_ref().unwrap()
        ));
        let error = after.messages.last().unwrap();
        assert_eq!(error.role, Role::System);
        assert!(error.is_error);
        assert_eq!(error.text, "Server error: critic exploded");
        assert!(!dispatcher.is_sending());
    }

    #[tokio::test]
    async fn test_failure_before_any_run_leaves_last_run_absent() {
        let (dispatcher, _backend) =
            dispatcher_with(MockBackend::new(vec![fail(404, "")]));

        assert_eq!(
            dispatcher.send("hello").await,
            SendOutcome::Failed(ChatErrorKind::NotFound)
        );
        let snapshot = dispatcher.store().snapshot();
        assert!(snapshot.last_run.is_none());
        assert_eq!(snapshot.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_send_after_failure_works() {
        let (dispatcher, _backend) = dispatcher_with(MockBackend::new(vec![
            fail(500, ""),
            ok(RunState::new("recovered").with_critic_review(CriticReview::scored(0.6))),
        ]));

        dispatcher.send("one").await;
        let outcome = dispatcher.send("two").await;

        assert!(matches!(outcome, SendOutcome::Answered(ref run) if run.final_response == "recovered"));
        assert_eq!(dispatcher.store().snapshot().messages.len(), 4);
    }

    #[tokio::test]
    async fn test_raw_input_and_user_id_are_sent() {
        let backend = MockBackend::new(vec![]);
        let backend = Arc::new(backend);
        let dispatcher = MessageDispatcher::new(
            ConversationStore::new(),
            backend.clone(),
            ConnectivityFlag::new(),
        )
        .with_user_id(Some("ana".into()));

        dispatcher.send("  spaced  ").await;

        let requests = backend.requests.lock();
        assert_eq!(requests[0].message, "  spaced  ");
        assert_eq!(requests[0].user_id.as_deref(), Some("ana"));
    }

    #[tokio::test]
    async fn test_only_unreachable_kinds_or_success_touch_the_flag() {
        let (dispatcher, _backend) = dispatcher_with(MockBackend::new(vec![fail(404, "")]));
        dispatcher.connectivity.set_unreachable(true);

        dispatcher.send("first").await;
        assert!(dispatcher.connectivity.is_unreachable());

        dispatcher.send("second").await;
        assert!(!dispatcher.connectivity.is_unreachable());
    }

    #[tokio::test]
    async fn test_connection_refused_sets_flag() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let flag = ConnectivityFlag::new();
        let dispatcher = MessageDispatcher::new(
            ConversationStore::new(),
            Arc::new(genesis_api::HttpBackend::new(format!("http://{}", addr))),
            flag.clone(),
        );

        let outcome = dispatcher.send("hello").await;
        assert_eq!(outcome, SendOutcome::Failed(ChatErrorKind::ConnectionRefused));
        assert!(flag.is_unreachable());
        let snapshot = dispatcher.store().snapshot();
        assert!(snapshot.messages[1].text.starts_with("Backend unavailable"));
    }

    #[tokio::test]
    async fn test_connectivity_retry_leaves_conversation_alone() {
        let backend = Arc::new(MockBackend::new(vec![ok(docker_response())]));
        let store = ConversationStore::new();
        let flag = ConnectivityFlag::new();
        let dispatcher = MessageDispatcher::new(store.clone(), backend.clone(), flag.clone());
        let probe = ConnectivityProbe::new(backend.clone(), flag.clone());

        dispatcher.send("Docker containers").await;
        backend.healthy.store(false, Ordering::Relaxed);
        assert_eq!(probe.check_health().await, Reachability::Unreachable);
        let before = store.snapshot();

        backend.healthy.store(true, Ordering::Relaxed);
        assert_eq!(probe.retry().await, Reachability::Reachable);

        assert!(!flag.is_unreachable());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }
}
