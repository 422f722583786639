//! HTTP call pipeline
//!
//! This module provides the asynchronous CRUD client with:
//! - URI resolution against a base URL and header layering
//! - Pluggable authorization providers
//! - Single-attempt dispatch bounded by an end-to-end timeout
//! - Response decoding with raw bodies kept on failure
//! - Exactly-once completion callbacks and a completion notification bus

pub mod auth;
pub mod builder;
pub mod client;
pub mod decoder;
pub mod dispatcher;
pub mod events;
pub mod notifier;
pub mod transport;

pub use auth::{
    ApiKeyHeader, AuthorizationProvider, BearerToken, EnvBearerToken, FnProvider, QueryParam,
    StaticHeaders,
};
pub use builder::{overlay, RequestBuilder};
pub use client::{CallHandle, Client, ClientBuilder, ClientConfig, DEFAULT_BODY_CONTENT_TYPE, DEFAULT_TIMEOUT};
pub use decoder::{BodyDecoder, JsonDecoder, PlainTextDecoder, ResponseDecoder};
pub use dispatcher::Dispatcher;
pub use events::{CompletionEvent, NotificationBus, Subscription, RESPONSE_NOTIFICATION};
pub use notifier::{CallContext, Completion, CompletionNotifier};
pub use transport::{ReqwestTransport, Transport};

// Re-export commonly used types
pub use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
