//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Environment variables
//! - Command-line arguments

use crate::cli::Cli;
use crate::error::{Error, Result};
use restline_core::{
    ApiKeyHeader, AuthorizationProvider, BearerToken, ClientConfig, EnvBearerToken, QueryParam,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the service
    pub base_url: Option<String>,

    /// Timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Headers sent with every request
    pub headers: HashMap<String, String>,

    /// `Content-Type` for request bodies
    pub body_content_type: Option<String>,

    /// Authorization settings
    pub auth: AuthConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Authorization configuration; at most one scheme may be set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Literal bearer token
    pub bearer: Option<String>,

    /// Environment variable holding a bearer token, read per request
    pub bearer_env: Option<String>,

    /// API key header
    pub api_key: Option<ApiKeyConfig>,

    /// Query parameter credential
    pub query: Option<QueryAuthConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    pub header: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAuthConfig {
    pub name: String,
    pub value: String,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl AuthConfig {
    fn is_empty(&self) -> bool {
        self.bearer.is_none()
            && self.bearer_env.is_none()
            && self.api_key.is_none()
            && self.query.is_none()
    }

    /// Build the configured provider, if any
    pub fn provider(&self) -> Result<Option<Arc<dyn AuthorizationProvider>>> {
        let mut providers: Vec<Arc<dyn AuthorizationProvider>> = Vec::new();

        if let Some(token) = &self.bearer {
            providers.push(Arc::new(BearerToken::new(token.clone())));
        }
        if let Some(var) = &self.bearer_env {
            providers.push(Arc::new(EnvBearerToken::new(var.clone())));
        }
        if let Some(api_key) = &self.api_key {
            providers.push(Arc::new(ApiKeyHeader::new(api_key.header.clone(), api_key.key.clone())));
        }
        if let Some(query) = &self.query {
            providers.push(Arc::new(QueryParam::new(query.name.clone(), query.value.clone())));
        }

        if providers.len() > 1 {
            return Err(Error::config(
                "only one of auth.bearer, auth.bearer_env, auth.api_key and auth.query may be set",
            ));
        }
        Ok(providers.pop())
    }

    /// Name of the query parameter carrying a credential
    pub fn secret_query_param(&self) -> Option<&str> {
        self.query.as_ref().map(|q| q.name.as_str())
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| {
                debug!(error = %e, "YAML parse failed");
                Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: "YAML".to_string(),
                }
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                debug!(error = %e, "JSON parse failed");
                Error::InvalidFormat {
                    path: path.to_path_buf(),
                    expected: "JSON".to_string(),
                }
            })?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Failed to load config");
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            // Current directory
            PathBuf::from(".restline.yaml"),
            PathBuf::from(".restline.json"),
            PathBuf::from("restline.yaml"),
            PathBuf::from("restline.json"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let restline_dir = config_dir.join("restline");
            paths.push(restline_dir.join("config.yaml"));
            paths.push(restline_dir.join("config.json"));
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".restline.yaml"));
            paths.push(home_dir.join(".restline.json"));
        }

        paths
    }

    /// Apply command-line flags and environment (they take precedence)
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = Some(base_url.clone());
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_secs = Some(timeout);
        }

        // Command-line credentials replace whatever the file configured.
        let mut auth = AuthConfig::default();
        if let Some((header, key)) = &cli.api_key {
            auth.api_key = Some(ApiKeyConfig {
                header: header.clone(),
                key: key.clone(),
            });
        } else if let Some((name, value)) = &cli.query_auth {
            auth.query = Some(QueryAuthConfig {
                name: name.clone(),
                value: value.clone(),
            });
        } else if let Some(token) = &cli.token {
            auth.bearer = Some(token.clone());
        }
        if !auth.is_empty() {
            self.auth = auth;
        }
    }

    /// Core client configuration for this file
    pub fn client_config(&self) -> Result<ClientConfig> {
        let defaults = ClientConfig::default();
        let base_url = self.base_url.clone().ok_or_else(|| {
            Error::config("no base URL; pass --base-url, set RESTLINE_BASE_URL or add base_url to the config file")
        })?;

        Ok(ClientConfig {
            base_url: Some(base_url),
            timeout_secs: self.timeout_secs.unwrap_or(defaults.timeout_secs),
            headers: self.headers.clone(),
            body_content_type: self.body_content_type.clone().or(defaults.body_content_type),
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
