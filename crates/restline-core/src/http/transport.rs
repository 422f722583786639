//! Transport capability
//!
//! A [`Transport`] performs one network exchange. It owns connection handling,
//! TLS and redirects; the rest of the crate only sees
//! `send(request) -> raw response or error`.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{Error, Result, TransportError};
use crate::types::{RawResponse, Request};

/// Asynchronous single-attempt send capability
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send the request and read the complete response
    async fn send(&self, request: Request) -> std::result::Result<RawResponse, TransportError>;

    /// Headers the transport adds on its own; lowest merge precedence
    fn default_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    user_agent: HeaderValue,
}

impl ReqwestTransport {
    /// Create a transport with rustls and the crate's user agent
    pub fn new() -> Result<Self> {
        // No reqwest-level timeout: the dispatcher bounds the whole attempt.
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            user_agent: HeaderValue::from_static(concat!("restline/", env!("CARGO_PKG_VERSION"))),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(&e))?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers
    }
}
