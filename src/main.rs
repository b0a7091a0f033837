//! `edgequake-rerank` command line.
//!
//! Reads documents as JSON from a file or stdin, reranks them through the
//! configured provider and prints the result object to stdout.
//!
//! ```text
//! # Agent-tool shape: {"query": "...", "documents": [...]}
//! echo '{"query":"rust","documents":["a","b"]}' | edgequake-rerank
//!
//! # Raw upstream items with the query on the command line
//! edgequake-rerank --query "rust" --input hits.json
//! ```
//!
//! Configuration comes from `RERANK_*` environment variables; flags win.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use edgequake_rerank::{
    FallbackOrdering, HttpRerankProvider, Reconciler, RerankConfig, RerankHost, RerankProvider,
    RetryStrategy, RetryingProvider,
};

#[derive(Debug, Parser)]
#[command(name = "edgequake-rerank", version, about = "Rerank documents by relevance to a query")]
struct Cli {
    /// JSON input file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Query; when set, the input is a JSON array of raw items
    #[arg(short, long)]
    query: Option<String>,

    /// Provider model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum number of documents to return
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Provider base URL (without /v1/rerank)
    #[arg(long)]
    base_url: Option<String>,

    /// Provider API key
    #[arg(long)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Fallback ordering: "input" or "similarity"
    #[arg(long)]
    fallback: Option<String>,

    /// Extra attempts after a transient provider failure
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Report input errors in the output instead of exiting non-zero
    #[arg(long)]
    continue_on_fail: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn config(&self) -> Result<RerankConfig> {
        let mut config = RerankConfig::from_env().context("invalid RERANK_* environment")?;

        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(top_n) = self.top_n {
            config = config.with_top_n(top_n);
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = &self.fallback {
            match FallbackOrdering::from_str(raw) {
                Some(ordering) => config = config.with_fallback(ordering),
                None => bail!("unknown fallback ordering '{}'", raw),
            }
        }
        Ok(config)
    }

    fn read_input(&self) -> Result<String> {
        let mut input = String::new();
        match &self.input {
            Some(path) => {
                input = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
            }
            None => {
                std::io::stdin()
                    .read_to_string(&mut input)
                    .context("failed to read stdin")?;
            }
        }
        Ok(input)
    }
}

async fn run<P: RerankProvider>(host: RerankHost<P>, cli: &Cli, input: &str) -> Result<String> {
    match &cli.query {
        None => Ok(host.tool_call(input).await),
        Some(query) => {
            let items: Vec<Value> = match serde_json::from_str::<Value>(input)
                .context("input must be a JSON array of items")?
            {
                Value::Array(items) => items,
                other => vec![other],
            };
            let output = host.batch(Some(query.as_str()), &items).await?;
            Ok(serde_json::to_string(&output)?)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;
    let input = cli.read_input()?;

    info!(
        "Reranking with model {} at {} (top_n {})",
        config.model,
        config.endpoint(),
        config.top_n
    );

    let provider = HttpRerankProvider::new(config.clone())?;
    let output = if cli.retries > 0 {
        let strategy = RetryStrategy::ExponentialBackoff {
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            max_attempts: cli.retries + 1,
        };
        let reconciler = Reconciler::new(RetryingProvider::new(provider, strategy), &config);
        let host = RerankHost::new(reconciler).continue_on_fail(cli.continue_on_fail);
        run(host, &cli, &input).await?
    } else {
        let host = RerankHost::new(Reconciler::new(provider, &config))
            .continue_on_fail(cli.continue_on_fail);
        run(host, &cli, &input).await?
    };

    if cli.pretty {
        let value: Value = serde_json::from_str(&output)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", output);
    }
    Ok(())
}
