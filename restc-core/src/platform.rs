//! OS-specific application directories.

use std::path::PathBuf;

use crate::constants::APP_NAME;
use crate::error::{RcError, RcResult};

/// Application data directory, home of the default log directory.
///
/// - Windows: `%APPDATA%/restc`
/// - macOS: `~/Library/Application Support/restc`
/// - Linux: `~/.local/share/restc`
pub fn data_dir() -> RcResult<PathBuf> {
    let base = dirs::data_dir()
        .ok_or_else(|| RcError::Config("could not determine data directory".into()))?;
    Ok(base.join(APP_NAME))
}

/// Configuration directory holding `config.toml`.
///
/// - Windows: `%APPDATA%/restc`
/// - macOS: `~/Library/Application Support/restc`
/// - Linux: `~/.config/restc`
pub fn config_dir() -> RcResult<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| RcError::Config("could not determine config directory".into()))?;
    Ok(base.join(APP_NAME))
}
