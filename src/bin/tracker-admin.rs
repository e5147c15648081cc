//! CLI administration tool for redirect-tracker.
//!
//! Inspects the resolved configuration and exercises the click collector
//! without going through the HTTP server.
//!
//! # Usage
//!
//! ```bash
//! # Show the resolved configuration (collector endpoint masked)
//! cargo run --bin tracker-admin -- config
//!
//! # Print the payload a request would produce
//! cargo run --bin tracker-admin -- payload --path "/api/r?src=linkedin" -H "x-forwarded-for=1.2.3.4"
//!
//! # Send one synthetic click to the collector
//! cargo run --bin tracker-admin -- probe --src admin-probe
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (see `redirect_tracker::config`); `.env` is loaded first.

use redirect_tracker::config::{self, Config, mask_endpoint};
use redirect_tracker::prelude::*;

use anyhow::{Context, Result, bail};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;

/// CLI tool for managing redirect-tracker.
#[derive(Parser)]
#[command(name = "tracker-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the resolved configuration
    Config,

    /// Print the JSON payload built for a synthetic request
    Payload {
        /// Request path with query string
        #[arg(short, long, default_value = "/api/r?src=admin-preview")]
        path: String,

        /// Request header as name=value (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },

    /// Deliver one synthetic click to the configured collector
    Probe {
        /// Source tag recorded for the probe click
        #[arg(short, long, default_value = "admin-probe")]
        src: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => show_config()?,
        Commands::Payload { path, headers } => show_payload(&path, headers)?,
        Commands::Probe { src, yes } => probe(&src, yes).await?,
    }

    Ok(())
}

/// Parses a `name=value` header argument.
fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

/// Builds a request context from CLI arguments.
fn synthetic_context(path: &str, headers: Vec<(String, String)>) -> Result<RequestContext> {
    let uri: Uri = path
        .parse()
        .with_context(|| format!("Invalid request path '{}'", path))?;

    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::try_from(name.as_str())
            .with_context(|| format!("Invalid header name '{}'", name))?;
        let value = HeaderValue::try_from(value.as_str())
            .with_context(|| format!("Invalid header value for '{}'", name))?;
        map.append(name, value);
    }

    Ok(RequestContext::new(&uri, map, None))
}

/// Prints the resolved configuration with validation status.
fn show_config() -> Result<()> {
    let config = Config::from_env()?;

    println!("{}", "Configuration".bright_blue().bold());
    println!();
    println!("  Listen:       {}", config.listen_addr.cyan());
    println!("  Destination:  {}", config.destination_url.cyan());
    match &config.tracking_endpoint {
        Some(endpoint) => println!("  Collector:    {}", mask_endpoint(endpoint).cyan()),
        None => println!("  Collector:    {}", "disabled".yellow()),
    }
    println!("  Timeout:      {}ms", config.tracking_timeout_ms);
    println!("  Queue:        {}", config.click_queue_capacity);
    println!("  Concurrency:  {}", config.click_worker_concurrency);
    println!("  Drain:        {}s", config.shutdown_drain_secs);
    println!("  Log:          {} ({})", config.log_level, config.log_format);
    println!();

    match config.validate() {
        Ok(()) => println!("{}", "Configuration is valid".green().bold()),
        Err(e) => println!("{} {:#}", "Configuration is invalid:".red().bold(), e),
    }

    Ok(())
}

/// Prints the collector payload for a synthetic request.
fn show_payload(path: &str, headers: Vec<(String, String)>) -> Result<()> {
    let ctx = synthetic_context(path, headers)?;
    let event = ClickEvent::capture_now(&ctx);

    println!("{}", serde_json::to_string_pretty(&event)?);

    Ok(())
}

/// Sends one synthetic click event to the collector and reports its answer.
///
/// # Flow
///
/// 1. Load and validate configuration
/// 2. Show the target and payload
/// 3. Confirm (unless `--yes`): the collector will store a real row
/// 4. Deliver once, with the configured timeout
async fn probe(src: &str, skip_confirm: bool) -> Result<()> {
    let config = config::load_from_env()?;

    let Some(endpoint) = config.tracking_endpoint_url()? else {
        bail!("TRACKING_GAS_ENDPOINT is not set, nothing to probe");
    };

    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("src", src)
        .finish();
    let path = format!("/api/r?{}", query);
    let ctx = synthetic_context(
        &path,
        vec![("user-agent".to_string(), "tracker-admin".to_string())],
    )?;
    let event = ClickEvent::capture_now(&ctx);
    let collector = HttpCollector::new(endpoint, config.tracking_timeout())?;

    println!("{}", "Collector probe".bright_blue().bold());
    println!();
    println!("  Endpoint: {}", mask_endpoint(collector.endpoint().as_str()).cyan());
    println!("  Timeout:  {}ms", collector.timeout().as_millis());
    println!("  Source:   {}", event.source.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("This writes a row in the collector. Send probe?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    match collector.deliver(&event).await {
        Ok(CollectorStatus::Accepted) => {
            println!("{}", "Collector accepted the click (status: ok)".green().bold());
        }
        Ok(CollectorStatus::Duplicate) => {
            println!("{}", "Collector reported a duplicate".yellow().bold());
        }
        Ok(status @ CollectorStatus::Unrecognized(_)) => {
            println!(
                "{} {}",
                "Collector answered with an unrecognized status:".yellow().bold(),
                status
            );
        }
        Err(e) => {
            println!("{} {}", "Delivery failed:".red().bold(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}
