//! Error types and handling for agent-search core

use thiserror::Error;

/// Result type alias for agent-search operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for agent-search core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Search or lookup provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Malformed provider payloads
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Per-repository popularity lookup errors
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// The operation was cancelled through its token
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Failures reported by a search, popularity or browsing backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The backend asked us to slow down
    #[error("Rate limit exceeded: {message}")]
    RateLimited { message: String },

    /// Any other non-success response
    #[error("Request failed: {message}")]
    Other { message: String },

    /// The backend cannot be reached at all (missing executable, missing credentials)
    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },
}

impl ProviderError {
    /// Classify a failure message reported by a backend.
    ///
    /// Anything mentioning a rate limit is treated as rate-limited, the rest
    /// is an ordinary failure.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains("rate limit") {
            ProviderError::RateLimited { message }
        } else {
            ProviderError::Other { message }
        }
    }

    /// Whether this failure should be retried with backoff
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

/// Malformed response payloads
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid JSON from {source_name}: {message}")]
    InvalidJson {
        source_name: String,
        message: String,
    },

    #[error("Expected a number from {source_name}, got '{value}'")]
    NotANumber { source_name: String, value: String },
}

/// Popularity lookup failures, always absorbed by the enricher
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Popularity lookup for {repo} failed: {message}")]
    LookupFailed { repo: String, message: String },

    #[error("Popularity lookup for {repo} timed out")]
    TimedOut { repo: String },
}

impl Error {
    /// Rate-limit classification across wrapped errors
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Provider(e) if e.is_rate_limited())
    }

    /// Whether the error means the query could not be executed at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::Provider(ProviderError::Unavailable { .. }))
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
