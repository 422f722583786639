//! Client facade
//!
//! [`Client`] composes the builder, authorization, dispatcher, decoder and
//! notifier into one call pipeline:
//!
//! ```text
//! verb method -> RequestBuilder -> AuthorizationProvider -> Dispatcher
//!             -> ResponseDecoder -> CompletionNotifier (callback, then bus)
//! ```
//!
//! Configuration (base URL, authorization provider, timeout) is read when a
//! verb method is *called*, and the call starts on its own Tokio task right
//! away. Changing the configuration afterwards only affects later calls, and
//! dropping the returned [`CallHandle`] detaches the call without cancelling it.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn, Span};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::http::auth::AuthorizationProvider;
use crate::http::builder::RequestBuilder;
use crate::http::decoder::{BodyDecoder, ResponseDecoder};
use crate::http::dispatcher::Dispatcher;
use crate::http::events::NotificationBus;
use crate::http::notifier::{CallContext, Completion, CompletionNotifier};
use crate::http::transport::{ReqwestTransport, Transport};
use crate::types::{Method, Outcome, Request};

/// Timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `Content-Type` sent with bodies when none is configured
pub const DEFAULT_BODY_CONTENT_TYPE: &str = "application/json";

/// Serializable client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Absolute base URL all URIs are resolved against
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Client-level default headers
    pub headers: HashMap<String, String>,
    /// `Content-Type` for request bodies; `None` sends bodies without one
    pub body_content_type: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            headers: HashMap::new(),
            body_content_type: Some(DEFAULT_BODY_CONTENT_TYPE.to_string()),
        }
    }
}

/// Builder for configuring a [`Client`]
pub struct ClientBuilder {
    base_url: Url,
    authorization: Option<Arc<dyn AuthorizationProvider>>,
    timeout: Duration,
    default_headers: HeaderMap,
    body_content_type: Option<HeaderValue>,
    decoder: Option<Arc<dyn BodyDecoder>>,
    transport: Option<Arc<dyn Transport>>,
    notifications: Option<Arc<NotificationBus>>,
}

impl ClientBuilder {
    fn new(base_url: Url) -> Self {
        Self {
            base_url,
            authorization: None,
            timeout: DEFAULT_TIMEOUT,
            default_headers: HeaderMap::new(),
            body_content_type: Some(HeaderValue::from_static(DEFAULT_BODY_CONTENT_TYPE)),
            decoder: None,
            transport: None,
            notifications: None,
        }
    }

    pub fn authorization(mut self, provider: Arc<dyn AuthorizationProvider>) -> Self {
        self.authorization = Some(provider);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a header sent with every request.
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::configuration(format!("invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::configuration(format!("invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// `Content-Type` for requests that carry a body; `None` disables it
    pub fn body_content_type(mut self, content_type: Option<HeaderValue>) -> Self {
        self.body_content_type = content_type;
        self
    }

    pub fn decoder(mut self, decoder: Arc<dyn BodyDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Bus that completion events are published on; a private bus is created otherwise
    pub fn notifications(mut self, bus: Arc<NotificationBus>) -> Self {
        self.notifications = Some(bus);
        self
    }

    /// Builds the [`Client`].
    ///
    /// ## Errors
    ///
    /// Returns an error if the default transport cannot be constructed.
    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let decoder = self
            .decoder
            .map(ResponseDecoder::new)
            .unwrap_or_default();

        let mut default_headers = self.default_headers;
        if !default_headers.contains_key(ACCEPT) {
            default_headers.insert(ACCEPT, HeaderValue::from_static(decoder.content_type()));
        }

        let bus = self.notifications.unwrap_or_default();

        Ok(Client {
            inner: Arc::new(ClientInner {
                base_url: RwLock::new(self.base_url),
                authorization: RwLock::new(self.authorization),
                timeout: RwLock::new(self.timeout),
                default_headers,
                body_content_type: self.body_content_type,
                dispatcher: Dispatcher::new(transport),
                decoder,
                notifier: CompletionNotifier::new(bus),
            }),
        })
    }
}

/// Asynchronous CRUD client.
///
/// Cloning is cheap and clones share configuration and the notification bus.
///
/// ## Examples
///
/// ```rust,no_run
/// use restline_core::{BearerToken, Client};
/// use std::sync::Arc;
/// use url::Url;
///
/// # async fn example() -> restline_core::Result<()> {
/// let base_url = Url::parse("https://api.example.com/v1/").unwrap();
/// let client = Client::new(base_url, Some(Arc::new(BearerToken::new("sk-xxx"))))?;
///
/// let response = client.get("users/1", None).await?;
/// println!("{:?}", response.value);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: RwLock<Url>,
    authorization: RwLock<Option<Arc<dyn AuthorizationProvider>>>,
    timeout: RwLock<Duration>,
    default_headers: HeaderMap,
    body_content_type: Option<HeaderValue>,
    dispatcher: Dispatcher,
    decoder: ResponseDecoder,
    notifier: CompletionNotifier,
}

/// A call whose request has been built and is waiting for dispatch
struct PendingCall {
    context: CallContext,
    request: Result<Request>,
    timeout: Duration,
}

impl Client {
    /// Creates a new builder for configuring a client.
    pub fn builder(base_url: Url) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// Creates a client with the default transport and settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP transport cannot be constructed.
    pub fn new(base_url: Url, authorization: Option<Arc<dyn AuthorizationProvider>>) -> Result<Self> {
        let mut builder = Self::builder(base_url);
        if let Some(provider) = authorization {
            builder = builder.authorization(provider);
        }
        builder.build()
    }

    /// Creates a client from a [`ClientConfig`].
    ///
    /// ## Errors
    ///
    /// Returns a configuration error if the base URL is missing or invalid,
    /// or a header or content type cannot be used.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::builder_from_config(config)?.build()
    }

    /// Same as [`Client::from_config`] but returns the builder for further setup
    pub fn builder_from_config(config: &ClientConfig) -> Result<ClientBuilder> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| Error::configuration("base_url is not set"))?;
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::configuration(format!("invalid base_url '{}': {}", base_url, e)))?;

        let mut builder = Self::builder(base_url).timeout(Duration::from_secs(config.timeout_secs));
        for (name, value) in &config.headers {
            builder = builder.default_header(name, value)?;
        }

        let content_type = config
            .body_content_type
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| Error::configuration(format!("invalid body_content_type: {}", e)))?;

        Ok(builder.body_content_type(content_type))
    }

    pub fn base_url(&self) -> Url {
        read(&self.inner.base_url).clone()
    }

    /// Replace the base URL for subsequent calls
    pub fn set_base_url(&self, base_url: Url) {
        *self.inner.base_url.write().unwrap_or_else(PoisonError::into_inner) = base_url;
    }

    pub fn authorization(&self) -> Option<Arc<dyn AuthorizationProvider>> {
        read(&self.inner.authorization).clone()
    }

    /// Replace (or remove) the authorization provider for subsequent calls
    pub fn set_authorization(&self, provider: Option<Arc<dyn AuthorizationProvider>>) {
        *self.inner.authorization.write().unwrap_or_else(PoisonError::into_inner) = provider;
    }

    pub fn timeout(&self) -> Duration {
        *read(&self.inner.timeout)
    }

    /// Replace the timeout for subsequent calls
    pub fn set_timeout(&self, timeout: Duration) {
        *self.inner.timeout.write().unwrap_or_else(PoisonError::into_inner) = timeout;
    }

    /// The bus completion events are published on
    pub fn notifications(&self) -> Arc<NotificationBus> {
        self.inner.notifier.bus().clone()
    }

    /// Fetch a resource
    pub fn get(&self, uri: &str, headers: Option<HeaderMap>) -> CallHandle {
        self.request(Method::Get, uri, headers, None)
    }

    /// Create a resource from its full representation
    pub fn post(&self, uri: &str, body: impl Into<Bytes>) -> CallHandle {
        self.request(Method::Post, uri, None, Some(body.into()))
    }

    /// Replace a resource with a full representation
    pub fn put(&self, uri: &str, body: impl Into<Bytes>) -> CallHandle {
        self.request(Method::Put, uri, None, Some(body.into()))
    }

    /// Apply a delta payload to a resource
    pub fn patch(&self, uri: &str, delta: impl Into<Bytes>) -> CallHandle {
        self.request(Method::Patch, uri, None, Some(delta.into()))
    }

    /// Remove a resource
    pub fn delete(&self, uri: &str) -> CallHandle {
        self.request(Method::Delete, uri, None, None)
    }

    /// Issue any verb with optional per-call headers and body.
    ///
    /// Errors, including ones detected before dispatch, are returned as the
    /// outcome and published like any other completion.
    pub fn request(
        &self,
        method: Method,
        uri: &str,
        headers: Option<HeaderMap>,
        body: Option<Bytes>,
    ) -> CallHandle {
        let pending = self.begin(method, uri, headers, body);
        self.dispatch(pending, Completion::none())
    }

    /// Issue a call and invoke `callback` exactly once with its outcome.
    ///
    /// The callback runs on the call's task before the completion event is
    /// published. Awaiting the handle is optional.
    pub fn spawn<F>(
        &self,
        method: Method,
        uri: &str,
        headers: Option<HeaderMap>,
        body: Option<Bytes>,
        callback: F,
    ) -> CallHandle
    where
        F: FnOnce(&Outcome) + Send + 'static,
    {
        let pending = self.begin(method, uri, headers, body);
        self.dispatch(pending, Completion::new(callback))
    }

    /// Build and authorize a request without dispatching it
    pub fn prepare(
        &self,
        method: Method,
        uri: &str,
        headers: Option<&HeaderMap>,
        body: Option<Bytes>,
    ) -> Result<Request> {
        let authorization = self.authorization();
        self.request_builder()
            .build(method, uri, headers, body, authorization.as_deref())
    }

    fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(self.base_url())
            .with_transport_defaults(self.inner.dispatcher.transport().default_headers())
            .with_default_headers(self.inner.default_headers.clone())
            .with_body_content_type(self.inner.body_content_type.clone())
    }

    /// Snapshot configuration and build the request for one call
    fn begin(&self, method: Method, uri: &str, headers: Option<HeaderMap>, body: Option<Bytes>) -> PendingCall {
        let builder = self.request_builder();
        let authorization = self.authorization();
        let timeout = self.timeout();

        let request = builder.build(method, uri, headers.as_ref(), body, authorization.as_deref());

        let mut context = CallContext::new(method);
        context.url = match &request {
            Ok(request) => Some(request.url.clone()),
            Err(_) => builder.resolve(uri).ok(),
        };
        debug!(
            call_id = %context.call_id,
            %method,
            uri,
            base_url = %builder.base_url(),
            authorized = authorization.is_some(),
            "Built request"
        );

        PendingCall {
            context,
            request,
            timeout,
        }
    }

    /// Start the call on the current runtime.
    ///
    /// Without a runtime the call fails with a `Runtime` error, delivered like
    /// any other outcome.
    fn dispatch(&self, pending: PendingCall, completion: Completion) -> CallHandle {
        let call_id = pending.context.call_id;
        let completion = Arc::new(completion);

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                let outcome = Err(Error::runtime(format!("no Tokio runtime: {}", e)));
                let outcome = self.inner.notifier.deliver(pending.context, outcome, &completion);
                return CallHandle {
                    call_id,
                    state: CallState::Finished(Some(outcome)),
                };
            }
        };

        let fallback = Fallback {
            notifier: self.inner.notifier.clone(),
            context: pending.context.clone(),
            completion: completion.clone(),
        };
        let inner = self.inner.clone();
        let task = runtime.spawn(async move { inner.execute(pending, &completion).await });

        CallHandle {
            call_id,
            state: CallState::Running { task, fallback },
        }
    }
}

/// Handle to a call running on its own task.
///
/// Awaiting it yields the call's outcome. Dropping it detaches the call,
/// which still completes and publishes its event.
#[must_use = "the call runs either way; await the handle to get its outcome"]
pub struct CallHandle {
    call_id: Uuid,
    state: CallState,
}

enum CallState {
    Running { task: JoinHandle<Outcome>, fallback: Fallback },
    Finished(Option<Outcome>),
}

/// What is needed to report a task that died before delivering
struct Fallback {
    notifier: CompletionNotifier,
    context: CallContext,
    completion: Arc<Completion>,
}

impl CallHandle {
    /// Id carried by this call's completion event
    pub fn call_id(&self) -> Uuid {
        self.call_id
    }
}

impl Future for CallHandle {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        match &mut self.state {
            CallState::Running { task, fallback } => match Pin::new(task).poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(e)) => {
                    // Panicked or cancelled by runtime shutdown before delivery.
                    warn!(call_id = %fallback.context.call_id, error = %e, "Call task failed");
                    let outcome = Err(Error::runtime(format!("call task failed: {}", e)));
                    Poll::Ready(fallback.notifier.deliver(
                        fallback.context.clone(),
                        outcome,
                        &fallback.completion,
                    ))
                }
            },
            CallState::Finished(outcome) => Poll::Ready(
                outcome
                    .take()
                    .unwrap_or_else(|| Err(Error::runtime("call handle polled after completion"))),
            ),
        }
    }
}

impl fmt::Debug for CallHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            CallState::Running { .. } => "running",
            CallState::Finished(_) => "finished",
        };
        f.debug_struct("CallHandle")
            .field("call_id", &self.call_id)
            .field("state", &state)
            .finish()
    }
}

impl ClientInner {
    #[instrument(
        name = "api_request",
        skip_all,
        fields(
            call_id = %pending.context.call_id,
            http.method = %pending.context.method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
        )
    )]
    async fn execute(&self, pending: PendingCall, completion: &Completion) -> Outcome {
        let PendingCall {
            context,
            request,
            timeout,
        } = pending;

        let outcome = match request {
            Ok(request) => {
                Span::current().record("http.url", request.url.as_str());
                match self.dispatcher.send(request, timeout).await {
                    Ok(raw) => {
                        Span::current().record("http.status_code", raw.status);
                        self.decoder.decode(raw)
                    }
                    Err(error) => Err(error),
                }
            }
            Err(error) => {
                warn!(kind = %error.kind(), error = %error, "Request not dispatched");
                Err(error)
            }
        };

        if let Err(error) = &outcome {
            debug!(kind = %error.kind(), "Call failed");
        }

        self.notifier.deliver(context, outcome, completion)
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url().as_str())
            .field("authorization", &self.authorization())
            .field("timeout", &self.timeout())
            .field("transport", self.inner.dispatcher.transport())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthorizationError, ErrorKind, TransportError};
    use crate::http::auth::{BearerToken, FnProvider};
    use crate::types::RawResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records requests and answers every one with the same response
    #[derive(Debug)]
    struct RecordingTransport {
        status: u16,
        body: &'static str,
        requests: Mutex<Vec<Request>>,
    }

    impl RecordingTransport {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: Request) -> std::result::Result<RawResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(RawResponse::new(self.status, self.body))
        }
    }

    fn client(transport: Arc<RecordingTransport>) -> Client {
        Client::builder(Url::parse("https://api.example.com/v1/").unwrap())
            .transport(transport)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_verbs_use_expected_methods_and_bodies() {
        let transport = RecordingTransport::new(200, "");
        let client = client(transport.clone());

        client.get("items", None).await.unwrap();
        client.post("items", r#"{"name":"a"}"#).await.unwrap();
        client.put("items/1", r#"{"name":"b"}"#).await.unwrap();
        client.patch("items/1", r#"{"name":"c"}"#).await.unwrap();
        client.delete("items/1").await.unwrap();

        let requests = transport.requests();
        let methods: Vec<_> = requests.iter().map(|r| r.method).collect();
        assert_eq!(methods, Method::ALL.to_vec());
        assert!(requests[0].body.is_none());
        assert_eq!(requests[3].body.as_deref(), Some(&br#"{"name":"c"}"#[..]));
        assert!(requests[4].body.is_none());
        assert_eq!(requests[1].header("content-type"), Some("application/json"));
        assert_eq!(requests[0].header("accept"), Some("application/json"));
        assert_eq!(requests[4].url.as_str(), "https://api.example.com/v1/items/1");
    }

    #[tokio::test]
    async fn test_unsupported_body_never_reaches_transport() {
        let transport = RecordingTransport::new(200, "");
        let client = client(transport.clone());
        let mut sub = client.notifications().subscribe();

        let err = client
            .request(Method::Get, "items", None, Some(Bytes::from_static(b"x")))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedBody);
        assert!(transport.requests().is_empty());

        let event = sub.try_recv().unwrap();
        assert_eq!(event.outcome.unwrap_err().kind(), ErrorKind::UnsupportedBody);
        assert_eq!(event.url.map(|u| u.to_string()).as_deref(), Some("https://api.example.com/v1/items"));
    }

    #[tokio::test]
    async fn test_authorization_error_is_outcome() {
        let transport = RecordingTransport::new(200, "");
        let client = client(transport.clone());
        client.set_authorization(Some(Arc::new(FnProvider::new(|_r: Request| {
            Err(AuthorizationError::Rejected("revoked".to_string()))
        }))));

        let err = client.delete("items/1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(transport.requests().is_empty());

        // The failure does not stick to the client.
        client.set_authorization(None);
        assert!(client.delete("items/1").await.is_ok());
    }

    #[tokio::test]
    async fn test_base_url_change_applies_to_next_call() {
        let transport = RecordingTransport::new(200, "");
        let client = client(transport.clone());

        let first = client.get("a", None);
        client.set_base_url(Url::parse("https://other.example.com/").unwrap());
        let second = client.get("a", None);

        // The first handle is awaited after the change but keeps its snapshot.
        second.await.unwrap();
        first.await.unwrap();

        let mut urls: Vec<_> = transport.requests().iter().map(|r| r.url.to_string()).collect();
        urls.sort();
        assert_eq!(urls, vec!["https://api.example.com/v1/a", "https://other.example.com/a"]);
    }

    #[tokio::test]
    async fn test_spawn_invokes_callback_once() {
        let transport = RecordingTransport::new(200, r#"{"id":1}"#);
        let client = client(transport);
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = calls.clone();

        let handle = client.spawn(Method::Get, "items/1", None, None, move |outcome| {
            seen.lock().unwrap().push(outcome.as_ref().map(|r| r.value.clone()).ok());
        });
        let outcome = handle.await;

        assert!(outcome.is_ok());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![Some(Some(serde_json::json!({"id": 1})))]
        );
    }

    #[tokio::test]
    async fn test_prepare_does_not_dispatch() {
        let transport = RecordingTransport::new(200, "");
        let client = client(transport.clone());
        client.set_authorization(Some(Arc::new(BearerToken::new("t"))));

        let request = client.prepare(Method::Post, "items", None, Some(Bytes::from_static(b"{}"))).unwrap();
        assert_eq!(request.header("authorization"), Some("Bearer t"));
        assert!(transport.requests().is_empty());
        assert_eq!(client.notifications().published_count(), 0);
    }

    #[test]
    fn test_call_outside_runtime_is_delivered_once() {
        let transport = RecordingTransport::new(200, "");
        let client = client(transport.clone());
        let fired = Arc::new(Mutex::new(Vec::new()));
        let seen = fired.clone();

        let handle = client.spawn(Method::Delete, "items/1", None, None, move |outcome| {
            seen.lock().unwrap().push(outcome.as_ref().err().map(Error::kind));
        });

        let outcome = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(handle);
        assert_eq!(outcome.unwrap_err().kind(), ErrorKind::Runtime);
        assert_eq!(*fired.lock().unwrap(), vec![Some(ErrorKind::Runtime)]);
        assert_eq!(client.notifications().published_count(), 1);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.body_content_type.as_deref(), Some("application/json"));
        assert!(config.base_url.is_none());
    }

    #[tokio::test]
    async fn test_from_config() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "base_url": "https://api.example.com/",
            "timeout_secs": 5,
            "headers": {"X-Client": "restline"}
        }))
        .unwrap();

        let client = Client::from_config(&config).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(5));
        let request = client.prepare(Method::Get, "x", None, None).unwrap();
        assert_eq!(request.header("x-client"), Some("restline"));
        assert!(request.header("user-agent").unwrap().starts_with("restline/"));

        let missing = ClientConfig::default();
        assert!(matches!(Client::from_config(&missing), Err(Error::Configuration { .. })));

        let bad = ClientConfig {
            base_url: Some("not a url".to_string()),
            ..ClientConfig::default()
        };
        assert!(matches!(Client::from_config(&bad), Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_invalid_default_header() {
        let result = Client::builder(Url::parse("https://api.example.com").unwrap())
            .default_header("bad header", "v");
        assert!(result.is_err());
    }

    #[test]
    fn test_setters_and_defaults() {
        let client = client(RecordingTransport::new(200, ""));
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert!(client.authorization().is_none());

        client.set_timeout(Duration::from_millis(250));
        assert_eq!(client.timeout(), Duration::from_millis(250));

        let clone = client.clone();
        clone.set_base_url(Url::parse("https://b.example.com/").unwrap());
        assert_eq!(client.base_url().as_str(), "https://b.example.com/");
    }
}
