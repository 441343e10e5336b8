//! Errors raised while reading, merging, or checking `ojas.json5` layers.

use thiserror::Error;

/// Failure to produce an effective Ojas config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer file could not be read, or the cwd could not be resolved.
    #[error("failed to read config layer: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// A layer is not valid JSON5.
    #[error("config layer is not valid JSON5: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The merged value does not decode into [`crate::OjasConfig`].
    #[error("failed to decode merged config: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A key in one layer is unknown or has the wrong type.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    /// The merged memory or storage settings are unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}
