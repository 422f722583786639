//! HTTP request builder
//!
//! Resolves a relative URI against the base URL and assembles the header set
//! in precedence order (later layers replace earlier ones, names compared
//! case-insensitively):
//!
//! 1. transport defaults
//! 2. client defaults (including `Content-Type` when a body is present)
//! 3. authorization provider contributions
//! 4. per-call headers

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::error::{Error, Result};
use crate::http::auth::AuthorizationProvider;
use crate::types::{Method, Request};

/// Builder for constructing requests against one base URL
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
    transport_defaults: HeaderMap,
    default_headers: HeaderMap,
    body_content_type: Option<HeaderValue>,
}

impl RequestBuilder {
    /// Create a builder for the given base URL with no default headers
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            transport_defaults: HeaderMap::new(),
            default_headers: HeaderMap::new(),
            body_content_type: None,
        }
    }

    /// Headers the transport would send on its own
    pub fn with_transport_defaults(mut self, headers: HeaderMap) -> Self {
        self.transport_defaults = headers;
        self
    }

    /// Client-level headers sent with every request
    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    /// `Content-Type` applied at the client-default level when a body is present
    pub fn with_body_content_type(mut self, content_type: Option<HeaderValue>) -> Self {
        self.body_content_type = content_type;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request, applying authorization between the default and per-call layers
    pub fn build(
        &self,
        method: Method,
        uri: &str,
        headers: Option<&HeaderMap>,
        body: Option<Bytes>,
        authorization: Option<&dyn AuthorizationProvider>,
    ) -> Result<Request> {
        if body.is_some() && !method.accepts_body() {
            return Err(Error::UnsupportedBody { method });
        }

        let url = self.resolve(uri)?;

        let mut request = Request::new(method, url);
        overlay(&mut request.headers, &self.transport_defaults);
        overlay(&mut request.headers, &self.default_headers);
        if body.is_some() {
            if let Some(content_type) = &self.body_content_type {
                request.headers.insert(CONTENT_TYPE, content_type.clone());
            }
        }
        request.body = body;

        if let Some(provider) = authorization {
            request = provider.authorize(request)?;
        }

        if let Some(headers) = headers {
            overlay(&mut request.headers, headers);
        }

        Ok(request)
    }

    /// Resolve a URI reference against the base URL (RFC 3986)
    pub fn resolve(&self, uri: &str) -> Result<Url> {
        let invalid = |message: String| Error::InvalidUri {
            uri: uri.to_string(),
            base: self.base_url.to_string(),
            message,
        };

        let url = self.base_url.join(uri).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }

        Ok(url)
    }
}

/// Replace every header named in `layer`, keeping all of its values
pub fn overlay(target: &mut HeaderMap, layer: &HeaderMap) {
    for name in layer.keys() {
        target.remove(name);
        for value in layer.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}
