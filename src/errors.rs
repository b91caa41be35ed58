//! Error types shared across the crate.

use thiserror::Error;

use crate::chains::{ChainType, NetworkType};

pub type Result<T> = std::result::Result<T, DextractError>;

#[derive(Error, Debug)]
pub enum DextractError {
    /// No upstream mapping or adapter support for the requested chain pair.
    #[error("unsupported chain {chain}:{network}")]
    UnsupportedChain {
        chain: ChainType,
        network: NetworkType,
    },

    /// Registry lookup miss: no adapter registered under the requested key.
    #[error("no adapter registered for {0}")]
    AdapterNotFound(String),

    /// One or both tokens of a swap pair could not be resolved.
    #[error("one or both tokens not found: {from} -> {to}")]
    TokensNotFound { from: String, to: String },

    /// The routing collaborator returned no candidate routes.
    #[error("no swap routes found")]
    NoRoutesFound,

    /// Wrapped HTTP/provider failure from an upstream call.
    #[error("upstream request failed: {0}")]
    UpstreamRequestFailed(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for DextractError {
    fn from(err: reqwest::Error) -> Self {
        DextractError::UpstreamRequestFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DextractError {
    fn from(err: serde_json::Error) -> Self {
        DextractError::Cache(format!("serialization failed: {}", err))
    }
}
