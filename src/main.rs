mod args;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use args::Args;
use health_bulk_loader::{
    chunks::ChunkReader,
    constants::USER_AGENT,
    pipeline::{RunSummary, run_pipeline},
    sink::{BulkResponse, DryRunSink, HttpBulkSink},
};

fn build_progress(args: &Args) -> ProgressBar {
    if args.no_progress {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new_spinner();
    progress.set_prefix("ROWS");
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold} [{elapsed_precise}] {pos} rows ({per_sec}) {msg}",
    ) {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(250));
    progress
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stdout carries the per-chunk "<status> <body>" lines, so logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let chunks = ChunkReader::open(&args.input_path, &args.encoding, args.chunk_size)
        .with_context(|| format!("Failed opening input {}", args.input_path.display()))?;
    info!(
        input = %args.input_path.display(),
        encoding = chunks.encoding().name(),
        index = %args.index_name,
        es_url = %args.es_url,
        chunk_size = args.chunk_size,
        dry_run = args.dry_run,
        "starting bulk load"
    );

    let progress = build_progress(&args);
    let print_response = |chunk: usize, response: &BulkResponse| {
        progress.suspend(|| println!("{} {}", response.status, response.body));
        progress.set_message(format!("chunk {chunk} -> {}", response.status));
    };

    let summary: RunSummary = if args.dry_run {
        let sink = DryRunSink::default();
        let summary = run_pipeline(chunks, &sink, &args.index_name, &progress, print_response)
            .await
            .context("Dry run failed")?;
        info!(
            payloads = sink.payloads(),
            bytes = sink.bytes(),
            "dry run encoded payloads"
        );
        summary
    } else {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed creating HTTP client")?;
        let sink = HttpBulkSink::new(client, &args.es_url);
        run_pipeline(chunks, &sink, &args.index_name, &progress, print_response)
            .await
            .with_context(|| format!("Bulk load into {} failed", sink.bulk_url(&args.index_name)))?
    };
    progress.finish_and_clear();

    info!(
        chunks = summary.chunks,
        rows_read = summary.rows_read,
        rows_kept = summary.rows_kept,
        rows_skipped = summary.rows_skipped,
        chunks_sent = summary.chunks_sent,
        empty_chunks = summary.empty_chunks,
        failed_chunks = summary.failed_chunks,
        chunks_with_item_errors = summary.chunks_with_item_errors,
        "bulk load finished"
    );
    Ok(())
}
