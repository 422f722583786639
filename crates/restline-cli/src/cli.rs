//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use restline_core::Method;
use std::path::PathBuf;

/// Restline CLI - issue CRUD requests against a REST-style HTTP service
///
/// Resolves each URI against a base URL, applies the configured
/// authorization and prints the decoded response.
#[derive(Parser, Debug)]
#[command(
    name = "restline",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "RESTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Base URL that relative URIs are resolved against
    #[arg(long, global = true, env = "RESTLINE_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Bearer token sent as `Authorization: Bearer <token>`
    #[arg(long, global = true, env = "RESTLINE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API key sent in a header
    #[arg(long, global = true, value_name = "HEADER=KEY", value_parser = parse_key_value)]
    pub api_key: Option<(String, String)>,

    /// Credential appended as a query parameter
    #[arg(long, global = true, value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub query_auth: Option<(String, String)>,

    /// Extra request header; overrides configured headers and authorization
    #[arg(short = 'H', long = "header", global = true, value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Print the response status and headers
    #[arg(long, global = true)]
    pub include: bool,

    /// Print the prepared request instead of sending it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a resource
    Get(UriArgs),

    /// Create a resource
    Post(PostArgs),

    /// Replace a resource
    Put(DataArgs),

    /// Apply a partial update to a resource
    Patch(DataArgs),

    /// Remove a resource
    Delete(UriArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for commands without a body
#[derive(Parser, Debug)]
pub struct UriArgs {
    /// URI, relative to the base URL or absolute
    #[arg(value_name = "URI")]
    pub uri: String,
}

/// Arguments for the post command
#[derive(Parser, Debug)]
pub struct PostArgs {
    /// URI, relative to the base URL or absolute
    #[arg(value_name = "URI")]
    pub uri: String,

    /// Request body, or @FILE to read it from a file (@- for stdin)
    #[arg(short, long, value_name = "TEXT|@FILE")]
    pub data: Option<String>,
}

/// Arguments for commands that require a body
#[derive(Parser, Debug)]
pub struct DataArgs {
    /// URI, relative to the base URL or absolute
    #[arg(value_name = "URI")]
    pub uri: String,

    /// Request body, or @FILE to read it from a file (@- for stdin)
    #[arg(short, long, value_name = "TEXT|@FILE")]
    pub data: String,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// A request command reduced to what the handler needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestArgs {
    pub method: Method,
    pub uri: String,
    pub data: Option<String>,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Commands {
    /// The request this command issues; `None` for local commands
    pub fn request_args(&self) -> Option<RequestArgs> {
        let (method, uri, data) = match self {
            Self::Get(args) => (Method::Get, &args.uri, None),
            Self::Post(args) => (Method::Post, &args.uri, args.data.clone()),
            Self::Put(args) => (Method::Put, &args.uri, Some(args.data.clone())),
            Self::Patch(args) => (Method::Patch, &args.uri, Some(args.data.clone())),
            Self::Delete(args) => (Method::Delete, &args.uri, None),
            Self::Completions(_) => return None,
        };
        Some(RequestArgs {
            method,
            uri: uri.clone(),
            data,
        })
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Parse `NAME=VALUE`
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Parse `Name: value`
fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected 'Name: value', got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
