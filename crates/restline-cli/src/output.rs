//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable) for responses and
//! dry-run request previews.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use colored::Colorize;
use restline_core::http::HeaderMap;
use restline_core::{Request, Response};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::trace;

/// Serializable view of a response
#[derive(Debug, Serialize)]
pub struct ResponseView {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Vec<String>>>,
    pub body: Value,
}

impl ResponseView {
    pub fn new(response: &Response, include_headers: bool) -> Self {
        Self::from_parts(response.status, &response.headers, response.value.clone(), &response.body, include_headers)
    }

    /// View of a non-success response, whose body was never decoded
    pub fn failed(status: u16, body: &[u8]) -> Self {
        Self::from_parts(status, &HeaderMap::new(), None, body, false)
    }

    fn from_parts(status: u16, headers: &HeaderMap, value: Option<Value>, raw: &[u8], include_headers: bool) -> Self {
        let body = value.unwrap_or_else(|| {
            if raw.is_empty() {
                Value::Null
            } else {
                Value::String(String::from_utf8_lossy(raw).into_owned())
            }
        });

        Self {
            status,
            headers: include_headers.then(|| header_map(headers, false)),
            body,
        }
    }
}

/// Serializable, redacted view of a prepared request
#[derive(Debug, Serialize)]
pub struct RequestView {
    pub method: String,
    pub url: String,
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestView {
    /// Build a view with credentials masked; `secret_params` names query parameters to mask
    pub fn redacted(request: &Request, secret_params: &[&str]) -> Self {
        Self {
            method: request.method.to_string(),
            url: redaction::redact_query(&request.url, secret_params),
            headers: header_map(&request.headers, true),
            body: request
                .body
                .as_ref()
                .map(|body| String::from_utf8_lossy(body).into_owned()),
        }
    }
}

fn header_map(headers: &HeaderMap, redact: bool) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        let shown = if redact && (value.is_sensitive() || redaction::is_sensitive_header(name.as_str())) {
            redaction::mask().to_string()
        } else {
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        };
        map.entry(name.as_str().to_string()).or_default().push(shown);
    }
    map
}

/// Trait for formatting serializable output
pub trait OutputFormatter {
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // For human format, use pretty JSON as fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;

        if self.format == OutputFormat::Yaml {
            // serde_yaml already ends documents with a newline
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a response; `include` adds the status line and headers
    pub fn response(&mut self, response: &Response, include: bool) -> Result<()> {
        let view = ResponseView::new(response, include);
        trace!(status = view.status, "Writing response");

        if self.format != OutputFormat::Human {
            return self.data(&view);
        }

        if include {
            self.status_line(view.status)?;
            for (name, values) in view.headers.iter().flatten() {
                for value in values {
                    self.writeln(&format!("{}: {}", name, value))?;
                }
            }
            self.writeln("")?;
        }
        self.body(&view.body)
    }

    /// Write the body of a non-success response
    pub fn failed_response(&mut self, status: u16, body: &[u8]) -> Result<()> {
        let view = ResponseView::failed(status, body);

        if self.format != OutputFormat::Human {
            return self.data(&view);
        }
        if view.body.is_null() {
            return Ok(());
        }
        self.body(&view.body)
    }

    /// Write a prepared request for a dry run
    pub fn request(&mut self, view: &RequestView) -> Result<()> {
        if self.format != OutputFormat::Human {
            return self.data(view);
        }

        self.section("Request")?;
        let line = format!("{} {}", view.method, view.url);
        if self.use_color {
            self.writeln(&line.bold().to_string())?;
        } else {
            self.writeln(&line)?;
        }
        for (name, values) in &view.headers {
            for value in values {
                self.writeln(&format!("{}: {}", name, value))?;
            }
        }
        if let Some(body) = &view.body {
            self.writeln("")?;
            self.writeln(body)?;
        }
        Ok(())
    }

    fn status_line(&mut self, status: u16) -> Result<()> {
        let line = format!("HTTP {}", status);
        if !self.use_color {
            return self.writeln(&line);
        }
        let colored = if (200..300).contains(&status) {
            line.green()
        } else {
            line.red()
        };
        self.writeln(&colored.to_string())
    }

    fn body(&mut self, body: &Value) -> Result<()> {
        match body {
            Value::Null => Ok(()),
            Value::String(text) => self.writeln(text),
            other => self.writeln(&serde_json::to_string_pretty(other)?),
        }
    }
}
