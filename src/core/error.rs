use thiserror::Error;

use crate::core::types::TierId;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Tier not found: {0}")]
    TierNotFound(TierId),

    #[error("Tier {0} has no summary and has never been simulated")]
    NotSummarized(TierId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error("Invalid delta time: {0}")]
    InvalidDeltaTime(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
