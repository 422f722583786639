//! Error types for the restline core library
//!
//! Every failure a call can run into is a variant of [`Error`]. Errors are
//! `Clone` because one outcome is handed both to the caller's completion
//! callback and to every notification subscriber.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;

use crate::types::Method;

/// Main error type for restline operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The URI could not be resolved against the base URL
    #[error("Invalid URI '{uri}' relative to '{base}': {message}")]
    InvalidUri {
        uri: String,
        base: String,
        message: String,
    },

    /// A body was supplied for a verb that does not accept one
    #[error("{method} requests do not accept a body")]
    UnsupportedBody { method: Method },

    /// Connection-level failure reported by the transport
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The send did not complete within the configured timeout
    #[error("Request timed out after {}ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {}", String::from_utf8_lossy(body))]
    HttpStatus { status: u16, body: Bytes },

    /// A 2xx body could not be decoded
    #[error("Failed to decode response body: {message}")]
    Decode { message: String },

    /// The authorization provider could not authorize the request
    #[error("Authorization failed: {0}")]
    Authorization(#[from] AuthorizationError),

    /// The call could not run on the async runtime
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    /// Client construction errors; returned from constructors, never as an outcome
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidUri { .. } => ErrorKind::InvalidUri,
            Self::UnsupportedBody { .. } => ErrorKind::UnsupportedBody,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::Runtime { .. } => ErrorKind::Runtime,
            Self::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// HTTP status code, for `HttpStatus` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, for `HttpStatus` errors
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::HttpStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Whether the error was detected before anything was sent
    pub fn is_pre_dispatch(&self) -> bool {
        matches!(
            self,
            Self::InvalidUri { .. } | Self::UnsupportedBody { .. } | Self::Authorization(_)
        )
    }
}

/// Discriminant of [`Error`], convenient for matching and exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidUri,
    UnsupportedBody,
    Transport,
    Timeout,
    HttpStatus,
    Decode,
    Authorization,
    Runtime,
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidUri => "invalid_uri",
            Self::UnsupportedBody => "unsupported_body",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::HttpStatus => "http_status",
            Self::Decode => "decode",
            Self::Authorization => "authorization",
            Self::Runtime => "runtime",
            Self::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// Authorization errors raised by an [`AuthorizationProvider`](crate::http::AuthorizationProvider)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid authorization header: {0}")]
    InvalidHeader(String),

    #[error("Authorization rejected: {0}")]
    Rejected(String),
}

/// Classification of transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection could not be established (refused, DNS, TLS handshake)
    Connect,
    /// The request could not be written
    Request,
    /// The response body could not be read
    Body,
    /// Redirect handling failed
    Redirect,
    Other,
}

/// A failure reported by a [`Transport`](crate::http::Transport)
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a reqwest error
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let kind = if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_redirect() {
            TransportErrorKind::Redirect
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else if error.is_request() || error.is_builder() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };

        Self::new(kind, error.to_string())
    }
}
