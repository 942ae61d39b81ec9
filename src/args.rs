use clap::Parser;

use health_bulk_loader::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_ENCODING, DEFAULT_ES_URL, DEFAULT_INDEX_NAME, DEFAULT_INPUT_PATH,
};

#[derive(Debug, Parser)]
#[command(name = "health_bulk_loader")]
#[command(about = "Recode a health claims CSV extract and bulk-index it into Elasticsearch")]
pub struct Args {
    /// Source CSV. The first line is treated as a header and skipped.
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub input_path: std::path::PathBuf,

    /// Text encoding of the source file (WHATWG label; cp949 is accepted).
    #[arg(long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// Target index name.
    #[arg(long, default_value = DEFAULT_INDEX_NAME)]
    pub index_name: String,

    /// Search engine base URL. Requests go to <es-url>/<index-name>/_bulk.
    #[arg(long, default_value = DEFAULT_ES_URL)]
    pub es_url: String,

    /// Source rows per bulk request.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = parse_chunk_size)]
    pub chunk_size: usize,

    /// Read, transform and encode everything, but never send a request.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Hide the progress spinner.
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

fn parse_chunk_size(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err("chunk size must be at least 1".to_string()),
        Ok(size) => Ok(size),
        Err(err) => Err(format!("invalid chunk size '{value}': {err}")),
    }
}
