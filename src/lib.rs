pub mod bulk;
pub mod chunks;
pub mod common;
pub mod constants;
pub mod error;
pub mod mappings;
pub mod pipeline;
pub mod record;
pub mod sink;

pub use error::{LoadError, ParseError};
