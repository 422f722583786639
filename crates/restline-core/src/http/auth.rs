//! Authorization providers
//!
//! An [`AuthorizationProvider`] receives the pending request (URL, method,
//! body and the headers merged so far) and returns it with authorization
//! material added. Supported schemes:
//! - Bearer tokens, fixed or read from the environment
//! - API keys in an arbitrary header
//! - Query parameter credentials
//! - Static header sets with `${ENV:VAR}` expansion

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};

use crate::error::AuthorizationError;
use crate::types::Request;

/// Capability that contributes authorization to an outgoing request
pub trait AuthorizationProvider: Send + Sync + fmt::Debug {
    /// Return the request with authorization material applied
    fn authorize(&self, request: Request) -> Result<Request, AuthorizationError>;
}

fn header_name(name: &str) -> Result<HeaderName, AuthorizationError> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| AuthorizationError::InvalidHeader(format!("invalid header name '{}'", name)))
}

fn sensitive_value(name: &str, value: &str) -> Result<HeaderValue, AuthorizationError> {
    let mut value = HeaderValue::from_str(value).map_err(|_| {
        AuthorizationError::InvalidHeader(format!("invalid value for header '{}'", name))
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// `Authorization: Bearer <token>`
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken").field("token", &"***").finish()
    }
}

impl AuthorizationProvider for BearerToken {
    fn authorize(&self, request: Request) -> Result<Request, AuthorizationError> {
        let value = sensitive_value("authorization", &format!("Bearer {}", self.token))?;
        Ok(request.with_header(AUTHORIZATION, value))
    }
}

/// Bearer token read from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvBearerToken {
    var: String,
}

impl EnvBearerToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl AuthorizationProvider for EnvBearerToken {
    fn authorize(&self, request: Request) -> Result<Request, AuthorizationError> {
        let token = std::env::var(&self.var).map_err(|_| {
            AuthorizationError::MissingCredential(format!(
                "environment variable {} is not set",
                self.var
            ))
        })?;
        BearerToken::new(token).authorize(request)
    }
}

/// API key sent in a named header (for example `x-api-key`)
#[derive(Clone)]
pub struct ApiKeyHeader {
    header: String,
    key: String,
}

impl ApiKeyHeader {
    pub fn new(header: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            key: key.into(),
        }
    }
}

impl fmt::Debug for ApiKeyHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyHeader")
            .field("header", &self.header)
            .field("key", &"***")
            .finish()
    }
}

impl AuthorizationProvider for ApiKeyHeader {
    fn authorize(&self, request: Request) -> Result<Request, AuthorizationError> {
        let name = header_name(&self.header)?;
        let value = sensitive_value(&self.header, &self.key)?;
        Ok(request.with_header(name, value))
    }
}

/// Credential appended to the query string
#[derive(Clone)]
pub struct QueryParam {
    name: String,
    value: String,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Debug for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryParam")
            .field("name", &self.name)
            .field("value", &"***")
            .finish()
    }
}

impl AuthorizationProvider for QueryParam {
    fn authorize(&self, request: Request) -> Result<Request, AuthorizationError> {
        if self.name.is_empty() {
            return Err(AuthorizationError::Rejected(
                "query parameter name is empty".to_string(),
            ));
        }
        Ok(request.with_query_pair(&self.name, &self.value))
    }
}

/// A fixed set of headers; values may reference `${ENV:VAR}`
#[derive(Debug, Clone)]
pub struct StaticHeaders {
    headers: HashMap<String, String>,
}

impl StaticHeaders {
    pub fn new(headers: HashMap<String, String>) -> Self {
        Self { headers }
    }

    /// Expand environment variables in the format `${ENV:VAR_NAME}`
    fn expand_env_vars(&self, value: &str) -> Result<String, AuthorizationError> {
        let re = Regex::new(r"\$\{ENV:([^}]+)\}")
            .map_err(|e| AuthorizationError::Rejected(e.to_string()))?;

        let mut result = value.to_string();
        for cap in re.captures_iter(value) {
            let var_name = &cap[1];
            let env_value = std::env::var(var_name).map_err(|_| {
                AuthorizationError::MissingCredential(format!(
                    "environment variable {} is not set",
                    var_name
                ))
            })?;
            result = result.replace(&format!("${{ENV:{}}}", var_name), &env_value);
        }

        Ok(result)
    }
}

impl AuthorizationProvider for StaticHeaders {
    fn authorize(&self, mut request: Request) -> Result<Request, AuthorizationError> {
        for (name, value) in &self.headers {
            let expanded = self.expand_env_vars(value)?;
            request.headers.insert(header_name(name)?, sensitive_value(name, &expanded)?);
        }
        Ok(request)
    }
}

/// Adapts a closure into a provider
pub struct FnProvider<F> {
    f: F,
}

impl<F> FnProvider<F>
where
    F: Fn(Request) -> Result<Request, AuthorizationError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnProvider")
    }
}

impl<F> AuthorizationProvider for FnProvider<F>
where
    F: Fn(Request) -> Result<Request, AuthorizationError> + Send + Sync,
{
    fn authorize(&self, request: Request) -> Result<Request, AuthorizationError> {
        (self.f)(request)
    }
}
