//! Fetch lifecycle controller
//!
//! One controller owns the lifecycle of one request target. `trigger` only
//! records intent; a background driver task observes the pending flag and
//! dispatches. Triggers made before the driver wakes therefore coalesce into
//! a single dispatch carrying the last descriptor.

use chrono::Local;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ApiBase, Config};
use crate::errors::FormFetchError;
use crate::models::{LifecycleState, RequestDescriptor, ServerError};
use crate::token::{authorization_header, FileTokenStore, TokenProvider};
use crate::transport::{HttpTransport, OutboundRequest, ReqwestTransport, TransportError};

/// Bookkeeping that decides which request is current
#[derive(Debug)]
struct DispatchSlot {
    path: String,
    /// Bumped whenever the inputs of the next dispatch change
    generation: u64,
    /// Generation the driver last dispatched
    dispatched: u64,
    in_flight: Option<CancellationToken>,
}

struct Inner<T> {
    slot: Mutex<DispatchSlot>,
    state: watch::Sender<LifecycleState<T>>,
    wake: Notify,
    shutdown: CancellationToken,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
    api_base: ApiBase,
}

/// Owns one request lifecycle and exposes it to a consumer
pub struct FetchController<T> {
    inner: Arc<Inner<T>>,
    driver: JoinHandle<()>,
}

impl<T> FetchController<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a controller for `path`. Must be called inside a tokio runtime.
    pub fn new(
        path: &str,
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenProvider>,
        api_base: ApiBase,
    ) -> Self {
        let (state, _) = watch::channel(LifecycleState::default());

        let inner = Arc::new(Inner {
            slot: Mutex::new(DispatchSlot {
                path: path.to_string(),
                generation: 0,
                dispatched: 0,
                in_flight: None,
            }),
            state,
            wake: Notify::new(),
            shutdown: CancellationToken::new(),
            transport,
            tokens,
            api_base,
        });

        let driver = tokio::spawn(drive(inner.clone()));

        Self { inner, driver }
    }

    /// Controller backed by reqwest and the persisted token store
    pub fn from_config(path: &str, config: &Config) -> Result<Self, FormFetchError> {
        let transport = ReqwestTransport::new(config)?;
        let tokens = FileTokenStore::from_config(&config.token);

        Ok(Self::new(
            path,
            Arc::new(transport),
            Arc::new(tokens),
            config.api_base.clone(),
        ))
    }

    /// Mark the controller pending with `descriptor` (GET without body when `None`).
    ///
    /// Clears the previous error immediately. Any request already in flight
    /// is cancelled and its outcome will not be applied.
    pub fn trigger(&self, descriptor: Option<RequestDescriptor>) {
        let descriptor = descriptor.unwrap_or_default();

        let mut slot = self.inner.lock_slot();
        if self.inner.shutdown.is_cancelled() {
            warn!("Ignoring trigger on detached controller for {}", slot.path);
            return;
        }

        slot.generation += 1;
        if let Some(previous) = slot.in_flight.take() {
            debug!("Superseding in-flight request for {}", slot.path);
            previous.cancel();
        }

        self.inner.state.send_modify(|state| {
            state.error = None;
            state.pending_descriptor = Some(descriptor);
            state.is_loading = true;
        });
        drop(slot);

        self.inner.wake.notify_one();
    }

    /// Change the request target.
    ///
    /// While a request is pending this cancels it and dispatches again
    /// against the new path with the stored descriptor.
    pub fn set_path(&self, path: &str) {
        let mut slot = self.inner.lock_slot();
        if slot.path == path || self.inner.shutdown.is_cancelled() {
            return;
        }
        slot.path = path.to_string();

        if !self.inner.state.borrow().is_loading {
            return;
        }

        slot.generation += 1;
        if let Some(previous) = slot.in_flight.take() {
            previous.cancel();
        }
        drop(slot);

        self.inner.wake.notify_one();
    }

    pub fn path(&self) -> String {
        self.inner.lock_slot().path.clone()
    }

    /// Tear the controller down; nothing is applied to its state afterwards
    pub fn detach(&self) {
        let slot = self.inner.lock_slot();
        if !self.inner.shutdown.is_cancelled() {
            debug!("Detaching fetch controller for {}", slot.path);
            self.inner.shutdown.cancel();
        }
    }

    pub fn is_detached(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    pub fn snapshot(&self) -> LifecycleState<T> {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState<T>> {
        self.inner.state.subscribe()
    }

    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn is_error(&self) -> bool {
        self.inner.state.borrow().is_error()
    }

    pub fn error(&self) -> Option<ServerError> {
        self.inner.state.borrow().error.clone()
    }

    /// Wait until the controller is no longer pending, or is detached
    pub async fn settled(&self) -> LifecycleState<T> {
        let mut rx = self.subscribe();
        tokio::select! {
            _ = self.inner.shutdown.cancelled() => {}
            _ = rx.wait_for(|state| !state.is_loading) => {}
        }
        self.snapshot()
    }
}

impl<T> Drop for FetchController<T> {
    fn drop(&mut self) {
        {
            let _slot = self.inner.lock_slot();
            self.inner.shutdown.cancel();
        }
        self.driver.abort();
    }
}

impl<T> Inner<T> {
    fn lock_slot(&self) -> MutexGuard<'_, DispatchSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Inner<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Claim the pending generation for dispatch, if there is one to claim
    fn claim_dispatch(&self) -> Option<(u64, String, RequestDescriptor, CancellationToken)> {
        let mut slot = self.lock_slot();
        if self.shutdown.is_cancelled() || slot.generation == slot.dispatched {
            return None;
        }

        let descriptor = {
            let state = self.state.borrow();
            if !state.is_loading {
                return None;
            }
            state.pending_descriptor.clone().unwrap_or_default()
        };

        slot.dispatched = slot.generation;
        if let Some(previous) = slot.in_flight.take() {
            previous.cancel();
        }
        let cancel = self.shutdown.child_token();
        slot.in_flight = Some(cancel.clone());

        Some((slot.generation, slot.path.clone(), descriptor, cancel))
    }

    fn build_request(&self, path: &str, descriptor: RequestDescriptor) -> OutboundRequest {
        let token = self.tokens.token();

        OutboundRequest {
            url: self.api_base.url_for(path),
            method: descriptor.method,
            headers: vec![(
                "authorization".to_string(),
                authorization_header(token.as_deref()),
            )],
            body: descriptor.body,
        }
    }

    /// Apply a settled response if it still belongs to the current generation.
    ///
    /// Returns whether the state was updated.
    fn settle(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        outcome: Result<Value, TransportError>,
    ) -> bool {
        let mut slot = self.lock_slot();
        if cancel.is_cancelled() || self.shutdown.is_cancelled() || slot.generation != generation {
            debug!(
                "Discarding stale response for {} (generation {}, current {})",
                slot.path, generation, slot.generation
            );
            return false;
        }
        slot.in_flight = None;

        let result = match outcome {
            Ok(body) => serde_json::from_value::<T>(body)
                .map_err(|e| ServerError::new(format!("Unexpected response body: {}", e))),
            Err(err) => Err(server_error_from(err)),
        };

        match result {
            Ok(data) => {
                info!("Request to {} succeeded", slot.path);
                self.state.send_modify(|state| {
                    state.data = Some(data);
                    state.error = None;
                    finish(state);
                });
            }
            Err(error) => {
                warn!("Request to {} failed: {}", slot.path, error);
                self.state.send_modify(|state| {
                    state.error = Some(error);
                    finish(state);
                });
            }
        }

        true
    }
}

fn finish<T>(state: &mut LifecycleState<T>) {
    state.is_loading = false;
    state.pending_descriptor = None;
    state.settled_at = Some(Local::now());
}

/// Collapse any transport failure into a `ServerError`.
///
/// The `errors` payload is attached only when the response body is a JSON object.
pub fn server_error_from(err: TransportError) -> ServerError {
    let mut error = ServerError::new(err.message);

    if let Some(response) = err.response {
        if let Value::Object(body) = response.data {
            error.errors = body.get("errors").filter(|errors| !errors.is_null()).cloned();
        }
    }

    error
}

async fn drive<T>(inner: Arc<Inner<T>>)
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    loop {
        tokio::select! {
            _ = inner.shutdown.cancelled() => break,
            _ = inner.wake.notified() => {}
        }

        if let Some((generation, path, descriptor, cancel)) = inner.claim_dispatch() {
            let request = inner.build_request(&path, descriptor);
            debug!(
                "Dispatching {} {} (generation {})",
                request.method.as_str(),
                request.url,
                generation
            );
            tokio::spawn(run_request(inner.clone(), generation, request, cancel));
        }
    }
}

async fn run_request<T>(
    inner: Arc<Inner<T>>,
    generation: u64,
    request: OutboundRequest,
    cancel: CancellationToken,
) where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let outcome = tokio::select! {
        _ = cancel.cancelled() => {
            debug!("Cancelled request to {} (generation {})", request.url, generation);
            return;
        }
        outcome = inner.transport.send(request.clone()) => outcome,
    };

    inner.settle(generation, &cancel, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Method;
    use crate::token::StaticToken;
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::oneshot;

    type Reply = Result<Value, TransportError>;

    /// Transport whose responses are released by the test
    #[derive(Default)]
    struct ScriptedTransport {
        requests: Mutex<Vec<OutboundRequest>>,
        replies: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
    }

    impl ScriptedTransport {
        /// Transport with `count` pending replies and their senders
        fn gated(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<Reply>>) {
            let transport = Self::default();
            let mut senders = Vec::new();
            {
                let mut replies = transport.replies.lock().unwrap();
                for _ in 0..count {
                    let (tx, rx) = oneshot::channel();
                    senders.push(tx);
                    replies.push_back(rx);
                }
            }
            (Arc::new(transport), senders)
        }

        /// Transport that answers immediately, in order
        fn replying(replies: Vec<Reply>) -> Arc<Self> {
            let (transport, senders) = Self::gated(replies.len());
            for (tx, reply) in senders.into_iter().zip(replies) {
                tx.send(reply).unwrap();
            }
            transport
        }

        fn requests(&self) -> Vec<OutboundRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: OutboundRequest) -> Result<Value, TransportError> {
            self.requests.lock().unwrap().push(request);
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(TransportError::network("reply dropped"))),
                None => Err(TransportError::network("no scripted reply")),
            }
        }
    }

    fn controller<T>(transport: Arc<ScriptedTransport>) -> FetchController<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        FetchController::new(
            "/users/",
            transport,
            Arc::new(StaticToken::new("abc")),
            ApiBase::Fixed("http://api.test".to_string()),
        )
    }

    async fn wait_for_requests(transport: &ScriptedTransport, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while transport.requests().len() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("request was never dispatched");
    }

    async fn let_tasks_run() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn unprocessable(body: Value) -> TransportError {
        TransportError {
            message: "Request failed with status code 422".to_string(),
            response: Some(TransportResponse {
                status: 422,
                data: body,
            }),
        }
    }

    #[tokio::test]
    async fn test_trigger_marks_pending_synchronously() {
        let (transport, _replies) = ScriptedTransport::gated(1);
        let controller: FetchController<Value> = controller(transport);

        assert!(!controller.is_loading());
        controller.trigger(None);

        assert!(controller.is_loading());
        let state = controller.snapshot();
        assert_eq!(state.pending_descriptor, Some(RequestDescriptor::get()));
        assert_eq!(state.outcome(), Some(crate::models::RequestOutcome::Pending));
    }

    #[tokio::test]
    async fn test_success_stores_data() {
        let transport = ScriptedTransport::replying(vec![Ok(json!({"id": 1}))]);
        let controller: FetchController<Value> = controller(transport.clone());

        controller.trigger(None);
        let state = controller.settled().await;

        assert_eq!(state.data, Some(json!({"id": 1})));
        assert_eq!(state.error, None);
        assert!(!state.is_loading);
        assert!(state.settled_at.is_some());
        assert!(state.pending_descriptor.is_none());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "http://api.test/users/");
        assert_eq!(requests[0].method, Method::Get);
    }

    #[tokio::test]
    async fn test_success_deserializes_into_typed_data() {
        #[derive(Debug, Clone, PartialEq, Deserialize)]
        struct User {
            id: u32,
            name: String,
        }

        let transport = ScriptedTransport::replying(vec![Ok(json!({"id": 3, "name": "ada"}))]);
        let controller: FetchController<User> = controller(transport);

        controller.trigger(None);
        controller.settled().await;

        assert_eq!(
            controller.data(),
            Some(User {
                id: 3,
                name: "ada".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_unexpected_body_shape_is_a_failure() {
        #[derive(Debug, Clone, Deserialize)]
        #[allow(dead_code)]
        struct User {
            id: u32,
        }

        let transport = ScriptedTransport::replying(vec![Ok(json!(["not", "a", "user"]))]);
        let controller: FetchController<User> = controller(transport);

        controller.trigger(None);
        let state = controller.settled().await;

        assert!(state.is_error());
        assert!(state.data.is_none());
        assert!(state.error.unwrap().message.starts_with("Unexpected response body"));
    }

    #[tokio::test]
    async fn test_failure_attaches_structured_errors() {
        let transport = ScriptedTransport::replying(vec![Err(unprocessable(
            json!({"errors": {"name": ["required"]}}),
        ))]);
        let controller: FetchController<Value> = controller(transport);

        controller.trigger(Some(RequestDescriptor::post(
            json!({"name": ""}).as_object().cloned().unwrap(),
        )));
        controller.settled().await;

        assert!(controller.is_error());
        assert!(!controller.is_loading());
        let error = controller.error().unwrap();
        assert_eq!(error.message, "Request failed with status code 422");
        assert_eq!(error.errors, Some(json!({"name": ["required"]})));
    }

    #[tokio::test]
    async fn test_failure_with_null_or_scalar_body_has_no_errors() {
        let transport = ScriptedTransport::replying(vec![
            Err(unprocessable(Value::Null)),
            Err(unprocessable(Value::String("Bad Request".to_string()))),
            Err(TransportError::network("connection refused")),
        ]);
        let controller: FetchController<Value> = controller(transport);

        for expected in [
            "Request failed with status code 422",
            "Request failed with status code 422",
            "connection refused",
        ] {
            controller.trigger(None);
            controller.settled().await;

            let error = controller.error().unwrap();
            assert_eq!(error.message, expected);
            assert_eq!(error.errors, None);
        }
    }

    #[tokio::test]
    async fn test_trigger_clears_previous_error() {
        let (transport, mut replies) = ScriptedTransport::gated(2);
        let controller: FetchController<Value> = controller(transport.clone());

        controller.trigger(None);
        wait_for_requests(&transport, 1).await;
        replies
            .remove(0)
            .send(Err(TransportError::network("offline")))
            .unwrap();
        controller.settled().await;
        assert!(controller.is_error());

        controller.trigger(None);
        assert!(!controller.is_error());
        assert!(controller.is_loading());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_data() {
        let transport = ScriptedTransport::replying(vec![
            Ok(json!({"id": 1})),
            Err(TransportError::network("offline")),
        ]);
        let controller: FetchController<Value> = controller(transport);

        controller.trigger(None);
        controller.settled().await;
        controller.trigger(None);
        let state = controller.settled().await;

        assert_eq!(state.data, Some(json!({"id": 1})));
        assert!(state.is_error());
    }

    #[tokio::test]
    async fn test_triggers_before_dispatch_coalesce() {
        let transport = ScriptedTransport::replying(vec![Ok(json!({"ok": true}))]);
        let controller: FetchController<Value> = controller(transport.clone());

        controller.trigger(None);
        controller.trigger(Some(RequestDescriptor::new(Method::Delete)));
        let last = RequestDescriptor::new(Method::Put)
            .with_body(json!({"name": "last"}).as_object().cloned().unwrap());
        controller.trigger(Some(last.clone()));

        controller.settled().await;
        let_tasks_run().await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].body, last.body);
    }

    #[tokio::test]
    async fn test_trigger_after_dispatch_supersedes_in_flight_request() {
        let (transport, mut replies) = ScriptedTransport::gated(2);
        let controller: FetchController<Value> = controller(transport.clone());
        let mut rx = controller.subscribe();

        controller.trigger(Some(RequestDescriptor::new(Method::Get)));
        wait_for_requests(&transport, 1).await;

        controller.trigger(Some(RequestDescriptor::new(Method::Patch)));
        wait_for_requests(&transport, 2).await;
        rx.borrow_and_update();

        // The first request was cancelled; a late answer must change nothing.
        let _ = replies.remove(0).send(Ok(json!({"id": 1})));
        let_tasks_run().await;
        assert!(!rx.has_changed().unwrap());
        assert!(controller.is_loading());
        assert_eq!(controller.data(), None);

        replies.remove(0).send(Ok(json!({"id": 2}))).unwrap();
        let state = controller.settled().await;

        assert_eq!(state.data, Some(json!({"id": 2})));
        assert_eq!(transport.requests()[1].method, Method::Patch);
    }

    #[tokio::test]
    async fn test_stale_generation_is_not_applied() {
        let (transport, _replies) = ScriptedTransport::gated(0);
        let controller: FetchController<Value> = controller(transport);

        controller.trigger(None);
        let stale = controller.inner.lock_slot().generation;
        controller.trigger(None);

        let token = CancellationToken::new();
        let applied = controller.inner.settle(stale, &token, Ok(json!({"id": 1})));

        assert!(!applied);
        assert!(controller.is_loading());
        assert_eq!(controller.data(), None);

        let current = controller.inner.lock_slot().generation;
        assert!(controller.inner.settle(current, &token, Ok(json!({"id": 2}))));
        assert_eq!(controller.data(), Some(json!({"id": 2})));
    }

    #[tokio::test]
    async fn test_no_state_change_after_detach() {
        let (transport, mut replies) = ScriptedTransport::gated(1);
        let controller: FetchController<Value> = controller(transport.clone());
        let mut rx = controller.subscribe();

        controller.trigger(None);
        wait_for_requests(&transport, 1).await;
        rx.borrow_and_update();

        controller.detach();
        let _ = replies.remove(0).send(Ok(json!({"id": 1})));
        let_tasks_run().await;

        assert!(controller.is_detached());
        assert!(!rx.has_changed().unwrap());
        assert_eq!(controller.data(), None);

        controller.trigger(None);
        let_tasks_run().await;
        assert_eq!(transport.requests().len(), 1);

        // Returns immediately once detached.
        controller.settled().await;
    }

    #[tokio::test]
    async fn test_drop_cancels_in_flight_request() {
        let (transport, mut replies) = ScriptedTransport::gated(1);
        let controller: FetchController<Value> = controller(transport.clone());
        let rx = controller.subscribe();

        controller.trigger(None);
        wait_for_requests(&transport, 1).await;
        drop(controller);
        let_tasks_run().await;

        // The transport future was dropped along with its reply receiver.
        assert!(replies.remove(0).send(Ok(json!({"id": 1}))).is_err());
        assert!(rx.has_changed().is_err());
    }

    #[tokio::test]
    async fn test_authorization_header_is_always_sent() {
        let transport = ScriptedTransport::replying(vec![Ok(Value::Null), Ok(Value::Null)]);

        let with_token: FetchController<Value> = controller(transport.clone());
        with_token.trigger(None);
        with_token.settled().await;

        let without_token: FetchController<Value> = FetchController::new(
            "/users/",
            transport.clone(),
            Arc::new(StaticToken::none()),
            ApiBase::Fixed("http://api.test".to_string()),
        );
        without_token.trigger(None);
        without_token.settled().await;

        let requests = transport.requests();
        assert_eq!(requests[0].header("authorization"), Some("Token abc"));
        assert_eq!(requests[1].header("authorization"), Some(""));
    }

    #[tokio::test]
    async fn test_token_is_read_at_dispatch_time() {
        let transport = ScriptedTransport::replying(vec![Ok(Value::Null), Ok(Value::Null)]);
        let tokens = Arc::new(crate::token::MemoryTokenStore::new("token"));
        let controller: FetchController<Value> = FetchController::new(
            "/me",
            transport.clone(),
            tokens.clone(),
            ApiBase::Fixed(String::new()),
        );

        controller.trigger(None);
        controller.settled().await;
        tokens.set_token("fresh");
        controller.trigger(None);
        controller.settled().await;

        let requests = transport.requests();
        assert_eq!(requests[0].header("authorization"), Some(""));
        assert_eq!(requests[1].header("authorization"), Some("Token fresh"));
    }

    #[tokio::test]
    async fn test_base_address_is_resolved_per_dispatch() {
        let var = "FORMFETCH_TEST_CONTROLLER_BASE";
        std::env::set_var(var, "http://first");
        let transport = ScriptedTransport::replying(vec![Ok(Value::Null), Ok(Value::Null)]);
        let controller: FetchController<Value> = FetchController::new(
            "/items",
            transport.clone(),
            Arc::new(StaticToken::none()),
            ApiBase::FromEnv {
                var: var.to_string(),
                fallback: String::new(),
            },
        );

        controller.trigger(None);
        controller.settled().await;
        std::env::set_var(var, "http://second");
        controller.trigger(None);
        controller.settled().await;
        std::env::remove_var(var);

        let requests = transport.requests();
        assert_eq!(requests[0].url, "http://first/items");
        assert_eq!(requests[1].url, "http://second/items");
    }

    #[tokio::test]
    async fn test_path_change_while_pending_redispatches() {
        let (transport, mut replies) = ScriptedTransport::gated(2);
        let controller: FetchController<Value> = controller(transport.clone());
        let descriptor = RequestDescriptor::post(json!({"q": 1}).as_object().cloned().unwrap());

        controller.trigger(Some(descriptor.clone()));
        wait_for_requests(&transport, 1).await;
        controller.set_path("/groups/");
        wait_for_requests(&transport, 2).await;

        let _ = replies.remove(0).send(Ok(json!("stale")));
        replies.remove(0).send(Ok(json!("fresh"))).unwrap();
        let state = controller.settled().await;

        assert_eq!(state.data, Some(json!("fresh")));
        let requests = transport.requests();
        assert_eq!(requests[1].url, "http://api.test/groups/");
        assert_eq!(requests[1].body, descriptor.body);
    }

    #[tokio::test]
    async fn test_path_change_while_idle_waits_for_trigger() {
        let transport = ScriptedTransport::replying(vec![Ok(Value::Null)]);
        let controller: FetchController<Value> = controller(transport.clone());

        controller.set_path("/groups/");
        let_tasks_run().await;
        assert!(transport.requests().is_empty());
        assert_eq!(controller.path(), "/groups/");

        controller.trigger(None);
        controller.settled().await;
        assert_eq!(transport.requests()[0].url, "http://api.test/groups/");
    }

    #[test]
    fn test_server_error_from_transport_error() {
        let error = server_error_from(unprocessable(json!({"detail": "nope"})));
        assert_eq!(error.errors, None);

        let error = server_error_from(unprocessable(json!({"errors": null})));
        assert_eq!(error.errors, None);

        let error = server_error_from(unprocessable(json!({"errors": ["flat"]})));
        assert_eq!(error.errors, Some(json!(["flat"])));
    }
}
