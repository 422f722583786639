//! Request dispatch with an end-to-end timeout
//!
//! One call is one transport attempt. The timeout bounds the whole exchange:
//! connecting, writing the request and reading the full response body.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn, Span};

use crate::error::{Error, Result};
use crate::http::transport::Transport;
use crate::types::{RawResponse, Request};

/// Sends built requests through a shared transport
#[derive(Debug, Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Send the request once, giving up after `timeout`
    #[instrument(
        name = "dispatch",
        skip(self, request),
        fields(
            http.method = %request.method,
            http.url = %request.url,
            timeout_ms = timeout.as_millis() as u64,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn send(&self, request: Request, timeout: Duration) -> Result<RawResponse> {
        debug!("Dispatching request");

        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => {
                Span::current().record("http.status_code", response.status);
                debug!(body_bytes = response.body.len(), "Transport returned response");
                Ok(response)
            }
            Ok(Err(error)) => {
                warn!(kind = ?error.kind, error = %error.message, "Transport failed");
                Err(Error::Transport(error))
            }
            Err(_elapsed) => {
                warn!("Request timed out");
                Err(Error::Timeout { timeout })
            }
        }
    }
}
