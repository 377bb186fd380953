//! Error types for configuring and bootstrapping restc.
//!
//! Request-level failures are not represented here: the client encodes those
//! as data inside its response envelopes. `RcError` covers everything that can
//! go wrong before a client exists (config files, logging, HTTP client setup).

use thiserror::Error;

/// Convenience type alias for Results using RcError.
pub type RcResult<T> = Result<T, RcError>;

/// Unified error type for setup and tooling failures.
#[derive(Error, Debug)]
pub enum RcError {
    // -- Configuration errors --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Network setup errors --
    /// The HTTP client could not be constructed.
    #[error("http error: {0}")]
    Http(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Generic --
    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for RcError {
    fn from(e: serde_json::Error) -> Self {
        RcError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for RcError {
    fn from(e: toml::de::Error) -> Self {
        RcError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for RcError {
    fn from(e: toml::ser::Error) -> Self {
        RcError::Config(format!("failed to serialize config: {e}"))
    }
}
