//! # Courier Runtime
//!
//! Wires the three isolated contexts together and performs one request
//! end to end, exercising the full relay path:
//!
//! ```text
//! PageClient ──board──→ RelayAgent ──port──→ BackgroundExecutor ──→ network
//!     ↑                                                               │
//!     └────────────── board event ←── tagged reply ←──────────────────┘
//! ```
//!
//! Each context gets its own task; the only coordination between them is
//! the document board and the message port, exactly as in production.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use courier_agent::RelayAgent;
use courier_client::{PageClient, RequestOptions};
use courier_executor::{
    AllowAll, AllowListPolicy, BackgroundExecutor, DomainAllowList, ReqwestFetcher,
};
use courier_transport::{message_port, DocumentBoard};

/// Perform a cross-origin request through the Courier relay.
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Relay one HTTP request through the three-context pipeline")]
struct Args {
    /// Target URL.
    url: String,

    /// HTTP method.
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Request header as `name: value`. Repeatable.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// JSON request body.
    #[arg(long, conflicts_with = "body")]
    json: Option<String>,

    /// Raw text request body.
    #[arg(long)]
    body: Option<String>,

    /// Per-request deadline in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    timeout_ms: u64,

    /// Restrict the executor to these domains. Repeatable; default allows
    /// every destination.
    #[arg(long = "allow")]
    allow: Vec<String>,
}

fn build_options(args: &Args) -> Result<RequestOptions> {
    let mut options = RequestOptions::new(&args.method, &args.url).timeout_ms(args.timeout_ms);

    for header in &args.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("header {header:?} is not in `name: value` form");
        };
        options = options.header(name.trim(), value.trim());
    }

    if let Some(json_text) = &args.json {
        let value = serde_json::from_str(json_text).context("--json must be valid JSON")?;
        options = options.json_body(value);
    } else if let Some(text) = &args.body {
        options = options.text_body(text);
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let options = build_options(&args)?;

    // Privileged context: executor + policy.
    let policy: Arc<dyn AllowListPolicy> = if args.allow.is_empty() {
        Arc::new(AllowAll)
    } else {
        Arc::new(DomainAllowList::new(args.allow.clone()))
    };
    let executor = BackgroundExecutor::new(
        ReqwestFetcher::new().context("failed to build HTTP client")?,
        policy,
    );

    // Observability: print each request summary as it lands.
    let mut summaries = executor.diagnostics().subscribe();
    tokio::spawn(async move {
        while let Ok(summary) = summaries.recv().await {
            info!(
                id = %summary.id,
                url = %summary.url,
                status = ?summary.status,
                duration_ms = summary.duration_ms,
                "request summary"
            );
        }
    });

    let (port, server) = message_port();
    tokio::spawn(async move { executor.serve(server).await });

    // Mediating context: the relay agent.
    let board = Arc::new(DocumentBoard::new());
    let agent = RelayAgent::new(Arc::clone(&board), port);
    tokio::spawn(async move { agent.run().await });

    // Page context: issue the request and report.
    let client = PageClient::new(board);
    match client.request(options).await {
        Ok(response) => {
            println!("{} {}", response.status, response.status_text);
            for (name, value) in &response.headers {
                println!("{name}: {value}");
            }
            println!();
            match &response.body_parsed {
                Some(parsed) => println!("{}", serde_json::to_string_pretty(parsed)?),
                None => println!("{}", response.body),
            }
            if !response.ok {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("request failed: {error}");
            std::process::exit(1);
        }
    }

    Ok(())
}
