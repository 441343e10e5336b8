//! Error types for memory operations.

/// Errors returned by stores, the extractor, and the memory facade.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Regex compilation error.
    #[error("regex error: {0}")]
    Regex(String),
    /// Role string is not one of user, assistant, system.
    #[error("invalid role: {0}")]
    InvalidRole(String),
    /// Storage key cannot be mapped onto the backing store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    /// Memory options failed validation.
    #[error("invalid memory options: {0}")]
    InvalidOptions(String),
}
