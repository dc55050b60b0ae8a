use crate::config::ConfigError;
use thiserror::Error;

/// Top-level error type for the resconf library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
