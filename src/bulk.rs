//! Elasticsearch `_bulk` payload encoding.

use serde::Serialize;
use tracing::debug;

use crate::{
    error::LoadError,
    record::{SkipReason, Transformed, transform_line},
};

#[derive(Serialize)]
struct IndexAction<'a> {
    index: IndexTarget<'a>,
}

#[derive(Serialize)]
struct IndexTarget<'a> {
    #[serde(rename = "_index")]
    index: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedChunk {
    /// NDJSON body: one action line and one document line per kept row.
    pub payload: String,
    pub rows_in: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
}

impl EncodedChunk {
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Transform and encode one chunk of raw lines for `index_name`.
///
/// Parse errors carry the 1-based row number within the chunk.
pub fn encode_chunk<S: AsRef<str>>(
    lines: &[S],
    index_name: &str,
) -> Result<EncodedChunk, LoadError> {
    let action = serde_json::to_string(&IndexAction {
        index: IndexTarget { index: index_name },
    })?;
    let mut encoded = EncodedChunk {
        payload: String::with_capacity(lines.len() * 320),
        rows_in: lines.len(),
        ..EncodedChunk::default()
    };

    for (row, line) in lines.iter().enumerate() {
        let transformed = transform_line(line.as_ref()).map_err(|source| LoadError::Parse {
            line: row as u64 + 1,
            source,
        })?;
        match transformed {
            Transformed::Keep(record) => {
                encoded.payload.push_str(&action);
                encoded.payload.push('\n');
                encoded.payload.push_str(&serde_json::to_string(&record)?);
                encoded.payload.push('\n');
                encoded.rows_kept += 1;
            }
            Transformed::Skip(SkipReason::CostOverThreshold { cost }) => {
                debug!(row = row + 1, cost, "dropping outlier row");
                encoded.rows_skipped += 1;
            }
        }
    }

    Ok(encoded)
}
