//! Restline Core - asynchronous CRUD client for REST-style HTTP services
//!
//! This crate issues GET/POST/PUT/PATCH/DELETE calls against a base URL and
//! reports every call's outcome exactly once.
//!
//! # Main Components
//!
//! - **Client**: verb methods, per-call configuration snapshots and callbacks
//! - **Authorization**: providers that decorate outgoing requests
//! - **Dispatch**: a single transport attempt bounded by a timeout
//! - **Notifications**: a broadcast bus with one event per completed call
//!
//! Calls run as Tokio tasks, so verb methods are meant to be called from
//! within a Tokio runtime. Outside one, a call completes immediately with an
//! [`ErrorKind::Runtime`] error instead of being sent.
//!
//! # Example
//!
//! ```no_run
//! use restline_core::{Client, Method};
//! use url::Url;
//!
//! # async fn example() -> restline_core::Result<()> {
//! let client = Client::new(Url::parse("https://api.example.com/").unwrap(), None)?;
//!
//! let item = client.get("items/1", None).await?;
//! client.patch("items/1", r#"{"done":true}"#).await?;
//!
//! // Runs to completion even though the handle is dropped
//! let _ = client.spawn(Method::Delete, "items/1", None, None, |outcome| {
//!     println!("deleted: {}", outcome.is_ok());
//! });
//! # let _ = item;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod types;

// Re-export main types for convenience
pub use error::{AuthorizationError, Error, ErrorKind, Result, TransportError, TransportErrorKind};
pub use http::{
    ApiKeyHeader, AuthorizationProvider, BearerToken, BodyDecoder, CallHandle, Client, ClientBuilder,
    ClientConfig, CompletionEvent, EnvBearerToken, FnProvider, JsonDecoder, NotificationBus,
    PlainTextDecoder, QueryParam, ReqwestTransport, StaticHeaders, Subscription, Transport,
    DEFAULT_TIMEOUT, RESPONSE_NOTIFICATION,
};
pub use types::{outcome_parts, Method, Outcome, RawResponse, Request, Response};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
