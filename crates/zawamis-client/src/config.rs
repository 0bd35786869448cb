//! Portal configuration loaded from environment variables.
//!
//! Every setting has a default so the console can start with zero
//! configuration against a local backend.

use std::path::PathBuf;
use std::time::Duration;

use zawamis_shared::constants::{DEFAULT_POLL_INTERVAL_MS, MAX_ATTACHMENT_SIZE};

#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL of the REST backend, without a trailing slash.
    /// Env: `API_BASE_URL`
    /// Default: `http://127.0.0.1:8000/api`
    pub api_base_url: String,

    /// SQLite file holding the storage slots.
    /// Env: `DATA_PATH`
    /// Default: `None` (platform data directory).
    pub data_path: Option<PathBuf>,

    /// How often views re-read storage.
    /// Env: `POLL_INTERVAL_MS`
    /// Default: 2000 ms
    pub poll_interval: Duration,

    /// Largest message attachment accepted, in bytes.
    /// Env: `MAX_ATTACHMENT_BYTES`
    /// Default: 5 MiB
    pub max_attachment_bytes: usize,

    /// Per-request timeout for REST calls.
    /// Env: `REQUEST_TIMEOUT_SECS`
    /// Default: 30 s
    pub request_timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".to_string(),
            data_path: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attachment_bytes: MAX_ATTACHMENT_SIZE,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl PortalConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = var("API_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                tracing::warn!("Empty API_BASE_URL, using default");
            } else {
                config.api_base_url = url.to_string();
            }
        }

        if let Some(path) = var("DATA_PATH") {
            if !path.is_empty() {
                config.data_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = var("POLL_INTERVAL_MS") {
            match val.parse::<u64>() {
                Ok(ms) if ms > 0 => config.poll_interval = Duration::from_millis(ms),
                _ => tracing::warn!(value = %val, "Invalid POLL_INTERVAL_MS, using default"),
            }
        }

        if let Some(val) = var("MAX_ATTACHMENT_BYTES") {
            match val.parse::<usize>() {
                Ok(n) => config.max_attachment_bytes = n,
                Err(_) => tracing::warn!(value = %val, "Invalid MAX_ATTACHMENT_BYTES, using default"),
            }
        }

        if let Some(val) = var("REQUEST_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %val, "Invalid REQUEST_TIMEOUT_SECS, using default"),
            }
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> PortalConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PortalConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = load(&[]);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_attachment_bytes, 5 * 1024 * 1024);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("API_BASE_URL", "https://jobs.example.org/api/"),
            ("DATA_PATH", "/tmp/portal.db"),
            ("POLL_INTERVAL_MS", "500"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(config.api_base_url, "https://jobs.example.org/api");
        assert_eq!(config.data_path, Some(PathBuf::from("/tmp/portal.db")));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = load(&[("POLL_INTERVAL_MS", "0"), ("MAX_ATTACHMENT_BYTES", "lots")]);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_attachment_bytes, MAX_ATTACHMENT_SIZE);
    }
}
