use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("store failed after {bytes_written} bytes were already written: {source}")]
    PartialWrite {
        bytes_written: u64,
        #[source]
        source: Box<SplitError>,
    },
}

pub type Result<T> = std::result::Result<T, SplitError>;
