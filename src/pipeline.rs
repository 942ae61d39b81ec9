//! Read -> transform -> encode -> send, one chunk at a time.

use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::{
    bulk::encode_chunk,
    chunks::Chunk,
    common::truncate_for_log,
    error::LoadError,
    sink::{BulkResponse, BulkSink},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub chunks: usize,
    pub rows_read: u64,
    pub rows_kept: u64,
    pub rows_skipped: u64,
    pub chunks_sent: usize,
    /// Chunks whose rows were all dropped. Their empty payload is still posted.
    pub empty_chunks: usize,
    /// Chunks answered with a non-2xx status.
    pub failed_chunks: usize,
    pub chunks_with_item_errors: usize,
}

/// Runs every chunk through the encoder and `sink`, strictly in order.
///
/// Every chunk is sent, including one whose rows were all dropped.
/// `on_response` is called with the 1-based chunk number and the response for
/// each of them. Any hard error stops the run immediately.
pub async fn run_pipeline<I, S, F>(
    chunks: I,
    sink: &S,
    index_name: &str,
    progress: &ProgressBar,
    mut on_response: F,
) -> Result<RunSummary, LoadError>
where
    I: IntoIterator<Item = Result<Chunk, LoadError>>,
    S: BulkSink,
    F: FnMut(usize, &BulkResponse),
{
    let mut summary = RunSummary::default();

    for chunk in chunks {
        let lines = chunk?;
        summary.chunks += 1;
        let chunk_number = summary.chunks;

        // Line 1 is the header, so data row r of this chunk sits at
        // 1 + rows_read + r in the file.
        let encoded = encode_chunk(&lines, index_name)
            .map_err(|err| err.offset_line(summary.rows_read + 1))?;
        summary.rows_read += lines.len() as u64;
        summary.rows_kept += encoded.rows_kept as u64;
        summary.rows_skipped += encoded.rows_skipped as u64;
        progress.inc(lines.len() as u64);

        if encoded.is_empty() {
            summary.empty_chunks += 1;
            warn!(
                chunk = chunk_number,
                rows = encoded.rows_in,
                skipped = encoded.rows_skipped,
                "no rows left after filtering; sending empty payload"
            );
        }

        let payload_bytes = encoded.payload.len();
        progress.set_message(format!("sending chunk {chunk_number}"));
        let response = sink.send(index_name, encoded.payload).await?;
        summary.chunks_sent += 1;

        info!(
            chunk = chunk_number,
            rows = encoded.rows_in,
            kept = encoded.rows_kept,
            skipped = encoded.rows_skipped,
            bytes = payload_bytes,
            status = response.status,
            "chunk sent"
        );
        if !response.is_success() {
            summary.failed_chunks += 1;
            warn!(
                chunk = chunk_number,
                status = response.status,
                body = %truncate_for_log(&response.body),
                "bulk request rejected"
            );
        } else if let Some(errors) = response.item_errors() {
            summary.chunks_with_item_errors += 1;
            warn!(
                chunk = chunk_number,
                failed = errors.failed,
                total = errors.total,
                reason = errors.first_reason.as_deref().unwrap_or("unknown"),
                "bulk response reported item errors"
            );
        }

        on_response(chunk_number, &response);
    }

    Ok(summary)
}
