//! Error types for ChatGuard

/// Result type alias using ChatGuard's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ChatGuard operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A repetition key could not be formed (missing sender or target)
    #[error("invalid repetition key: {0}")]
    InvalidKey(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Collaborator lookup failures (relationship list, message history)
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new invalid-key error
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
