//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "restc";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Linear backoff step; attempt `n` waits `n * step` before retrying.
pub const DEFAULT_BACKOFF_STEP_MS: u64 = 1_200;

/// Media type for all request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Media type for token endpoint requests.
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Base name of the rotated log file.
pub const LOG_FILE_NAME: &str = "restc.log";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_attempt_cap() {
        // initial attempt plus retries
        assert_eq!(DEFAULT_MAX_RETRIES + 1, 4);
    }

    #[test]
    fn test_version_is_set() {
        assert!(!APP_VERSION.is_empty());
    }
}
