//! Configuration module
//!
//! Resolves client settings from the environment for front ends (the CLI).
//! The upload client never reads the environment itself: whatever is resolved
//! here is passed in explicitly.

use std::env;
use std::time::Duration;

use crate::validation::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_MB};

// Subtitle burn-in is slow; long videos routinely need many minutes.
const DEFAULT_TIMEOUT_SECS: u64 = 30 * 60;

/// Client configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the subtitle service. No default: missing is a configuration error
    /// reported by the upload client.
    pub api_base: Option<String>,
    /// Per-upload timeout. `None` disables the timer.
    pub timeout: Option<Duration>,
    pub max_file_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment (after `.env` if present).
    ///
    /// - `SUBTITLER_API_BASE` (or `API_BASE`)
    /// - `SUBTITLER_TIMEOUT_SECS` (0 disables the timeout)
    /// - `SUBTITLER_MAX_FILE_SIZE_MB`
    /// - `SUBTITLER_ALLOWED_EXTENSIONS` (comma separated)
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("SUBTITLER_API_BASE")
            .or_else(|| lookup("API_BASE"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let timeout_secs = lookup("SUBTITLER_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("SUBTITLER_TIMEOUT_SECS must be a valid number"))?;

        let max_file_size_mb = lookup("SUBTITLER_MAX_FILE_SIZE_MB")
            .unwrap_or_else(|| DEFAULT_MAX_FILE_SIZE_MB.to_string())
            .trim()
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("SUBTITLER_MAX_FILE_SIZE_MB must be a valid number"))?;

        let allowed_extensions: Vec<String> = lookup("SUBTITLER_ALLOWED_EXTENSIONS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.join(","))
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        if allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "SUBTITLER_ALLOWED_EXTENSIONS must list at least one extension"
            ));
        }

        Ok(Self {
            api_base,
            timeout: timeout_from_secs(timeout_secs),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions,
        })
    }
}

/// Convert seconds to an optional timeout; zero means no timeout.
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_base, None);
        assert_eq!(config.timeout, Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_api_base_fallback_and_blank() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("API_BASE", "http://localhost:8000")]))
                .unwrap();
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8000"));

        let config = ClientConfig::from_lookup(lookup_from(&[
            ("SUBTITLER_API_BASE", "http://primary"),
            ("API_BASE", "http://secondary"),
        ]))
        .unwrap();
        assert_eq!(config.api_base.as_deref(), Some("http://primary"));

        let config =
            ClientConfig::from_lookup(lookup_from(&[("SUBTITLER_API_BASE", "   ")])).unwrap();
        assert_eq!(config.api_base, None);
    }

    #[test]
    fn test_timeout_zero_disables() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("SUBTITLER_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(
            ClientConfig::from_lookup(lookup_from(&[("SUBTITLER_TIMEOUT_SECS", "soon")])).is_err()
        );
        assert!(ClientConfig::from_lookup(lookup_from(&[(
            "SUBTITLER_MAX_FILE_SIZE_MB",
            "-1"
        )]))
        .is_err());
    }

    #[test]
    fn test_allowed_extensions_normalized() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            "SUBTITLER_ALLOWED_EXTENSIONS",
            " .MP4, mov ,,",
        )]))
        .unwrap();
        assert_eq!(config.allowed_extensions, vec!["mp4", "mov"]);

        assert!(ClientConfig::from_lookup(lookup_from(&[(
            "SUBTITLER_ALLOWED_EXTENSIONS",
            " , "
        )]))
        .is_err());
    }
}
