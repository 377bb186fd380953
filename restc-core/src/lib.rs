//! restc Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by the other restc crates:
//! - Client configuration (base URI, retry policy, auth, processors)
//! - A unified error type for setup and CLI failures
//! - Structured logging with tracing
//! - Platform data and config directories
//! - Common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{RcError, RcResult};
pub use logging::init_logging;
