use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read property file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write property file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config '{logical_id}' is not backed by a file and cannot be persisted")]
    NotPersistent { logical_id: String },

    #[error("config '{key}' holds non-numeric value '{value}': {source}")]
    MalformedDecimal {
        key: String,
        value: String,
        source: bigdecimal::ParseBigDecimalError,
    },
}
