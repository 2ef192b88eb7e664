//! Command-line batch runner.
//!
//! Reads a JSON array of articles (or `{ "articles": [...] }`) from a file or stdin, filters and
//! summarizes them with the configured provider, and prints the report as JSON on stdout.
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rustydigest::{
    batch::{BatchService, Item},
    config, logging, summarization,
};
use serde::Deserialize;

#[derive(Parser)]
#[command(
    name = "digest-batch",
    about = "Summarize a batch of articles from a JSON file"
)]
struct Cli {
    /// JSON file with the articles; reads stdin when omitted or `-`.
    input: Option<PathBuf>,
    /// Override `SUMMARIZE_BATCH_SIZE`.
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Override `SUMMARIZE_CONCURRENT_REQUESTS`.
    #[arg(long)]
    concurrency: Option<usize>,
    /// Override `SUMMARIZE_MAX_RETRIES`.
    #[arg(long)]
    max_retries: Option<u32>,
    /// Schedule every article, skipping the eligibility rules.
    #[arg(long)]
    no_filter: bool,
    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Wrapped {
        #[serde(alias = "items")]
        articles: Vec<Item>,
    },
    Bare(Vec<Item>),
}

impl InputDocument {
    fn into_items(self) -> Vec<Item> {
        match self {
            Self::Wrapped { articles } => articles,
            Self::Bare(items) => items,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    config::load_dotenv();
    logging::init_cli_tracing();
    config::init_config().context("failed to load configuration")?;

    let items = read_items(cli.input.as_deref())?;
    if items.is_empty() {
        bail!("no articles provided");
    }

    let config = config::get_config();
    let mut batch_config = config.batch_config();
    if let Some(chunk_size) = cli.chunk_size {
        batch_config.chunk_size = chunk_size;
    }
    if let Some(concurrency) = cli.concurrency {
        batch_config.max_concurrent = concurrency;
    }
    if let Some(max_retries) = cli.max_retries {
        batch_config.max_retries = max_retries;
    }

    let summarizer =
        summarization::get_summarizer(config).context("failed to build summarizer")?;
    let mut service = BatchService::new(
        summarizer,
        batch_config,
        config.filter_rules(),
        config.max_request_items.max(items.len()),
    );
    if cli.no_filter {
        service = service.without_filter();
    }

    let report = service
        .summarize_batch(items)
        .await
        .context("batch run failed")?;
    if let Some(stats) = &report.stats {
        tracing::info!(%stats, "Batch finished");
    }

    let output = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialize report")?;
    println!("{output}");
    Ok(())
}

fn read_items(input: Option<&Path>) -> Result<Vec<Item>> {
    let raw = match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read articles from {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read articles from stdin")?;
            buffer
        }
    };

    let document: InputDocument =
        serde_json::from_str(&raw).context("failed to parse articles JSON")?;
    Ok(document.into_items())
}
