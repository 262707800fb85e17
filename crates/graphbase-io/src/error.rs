use graphbase_graph::GraphError;
use thiserror::Error;

/// Errors raised while writing or reading GB files.
#[derive(Error, Debug)]
pub enum GbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot encode {what} {value:?} in GB format")]
    Unencodable { what: &'static str, value: String },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Checksum mismatch: file says {expected}, contents give {actual}")]
    ChecksumMismatch { expected: u64, actual: u64 },

    #[error("Utility type '{0}' is not supported")]
    UnsupportedUtil(char),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub(crate) fn parse_error(line: usize, message: impl Into<String>) -> GbError {
    GbError::Parse {
        line,
        message: message.into(),
    }
}
