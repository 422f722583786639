//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

use crate::cli::{CompletionsArgs, RequestArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, RequestView};
use bytes::Bytes;
use clap::CommandFactory;
use restline_core::http::{HeaderMap, HeaderName, HeaderValue};
use restline_core::{Client, CompletionEvent};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info, instrument};

/// Options that shape how a request is sent and shown
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub include: bool,
    pub dry_run: bool,
}

/// Handle get/post/put/patch/delete
#[instrument(skip_all, fields(method = %args.method, uri = %args.uri))]
pub async fn handle_request(
    args: RequestArgs,
    options: RequestOptions,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("request", &format!("{} {}", args.method, args.uri));

    let client = build_client(config)?;
    let headers = header_map(&options.headers)?;
    let body = args.data.as_deref().map(read_body).transpose()?;

    if options.dry_run {
        debug!("Dry run; request will not be sent");
        let request = client.prepare(args.method, &args.uri, Some(&headers), body)?;
        let secret_params: Vec<&str> = config.auth.secret_query_param().into_iter().collect();
        return output.request(&RequestView::redacted(&request, &secret_params));
    }

    let mut events = client.notifications().subscribe();
    let listener = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_completion(&event);
        }
    });

    info!("Sending request");
    let outcome = client
        .request(args.method, &args.uri, Some(headers), body)
        .await;

    // Dropping the client closes the bus so the listener drains and exits.
    drop(client);
    let _ = listener.await;

    match outcome {
        Ok(response) => output.response(&response, options.include),
        Err(error) => {
            if let restline_core::Error::HttpStatus { status, body } = &error {
                output.failed_response(*status, body)?;
            }
            Err(error.into())
        }
    }
}

/// Handle the completions command
pub fn handle_completions(args: &CompletionsArgs) -> Result<()> {
    use clap_complete::generate;
    use std::io;

    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();

    generate(args.shell.to_clap_shell(), &mut cmd, name, &mut io::stdout());

    Ok(())
}

/// Build a client from the merged configuration
pub fn build_client(config: &Config) -> Result<Client> {
    let client_config = config.client_config()?;
    let mut builder = Client::builder_from_config(&client_config)?;
    if let Some(provider) = config.auth.provider()? {
        builder = builder.authorization(provider);
    }
    Ok(builder.build()?)
}

/// Resolve `--data`: literal text, `@FILE` or `@-` for stdin
pub fn read_body(data: &str) -> Result<Bytes> {
    match data.strip_prefix('@') {
        Some("-") => {
            let mut buffer = Vec::new();
            std::io::stdin().read_to_end(&mut buffer)?;
            Ok(Bytes::from(buffer))
        }
        Some(path) => {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(Error::FileNotFound { path });
            }
            Ok(Bytes::from(std::fs::read(&path)?))
        }
        None => Ok(Bytes::from(data.to_string())),
    }
}

/// Convert `-H` pairs into a header map, keeping repeated names
pub fn header_map(pairs: &[(String, String)]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::invalid_args(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|e| Error::invalid_args(format!("invalid value for header '{}': {}", name, e)))?;
        headers.append(name, value);
    }
    Ok(headers)
}

fn log_completion(event: &CompletionEvent) {
    let outcome = match &event.outcome {
        Ok(response) => response.status.to_string(),
        Err(error) => error.kind().to_string(),
    };
    debug!(
        call_id = %event.call_id,
        method = %event.method,
        url = event.url.as_ref().map(|url| url.as_str()).unwrap_or("-"),
        outcome = %outcome,
        elapsed_ms = event.elapsed.as_millis() as u64,
        "Call completed"
    );
}
