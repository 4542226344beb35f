use std::collections::TryReserveError;

/// Errors that can occur while probing host capabilities.
///
/// Every variant is fatal to the probe attempt that produced it. Nothing is
/// retried internally; callers may run the whole probe again.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("host query failed: {0}")]
    Query(String),

    #[error("failed to compile capability pattern: {0}")]
    PatternCompile(String),

    #[error("failed to parse {0}")]
    Parse(String),

    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("no CPUs found")]
    NoCpus,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TryReserveError> for Error {
    fn from(err: TryReserveError) -> Self {
        Error::Allocation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
