//! Runtime configuration for the widget layer
//!
//! Mirrors the host-supplied bootstrap settings: backend address, optional
//! platform persistence address, stat queue sizing. Environment variables
//! override the defaults so the standalone harness can be pointed at a real
//! backend without code changes.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_API_BASE_URL;

/// Widget runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Task backend base URL, e.g. `http://localhost:8080/api`.
    pub api_base_url: String,
    /// Platform persistence base URL. `None` means standalone mode:
    /// no remote push, cache-only persistence.
    pub platform_api_url: Option<String>,
    /// Stat events buffered before a flush is attempted.
    pub stats_queue_max_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            platform_api_url: None,
            stats_queue_max_size: 20,
        }
    }
}

impl RuntimeConfig {
    /// Build a configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: `FLOWCAL_API_BASE_URL`,
    /// `FLOWCAL_PLATFORM_API_URL`, `FLOWCAL_STATS_QUEUE_MAX_SIZE`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: std::env::var("FLOWCAL_API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            platform_api_url: std::env::var("FLOWCAL_PLATFORM_API_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            stats_queue_max_size: std::env::var("FLOWCAL_STATS_QUEUE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stats_queue_max_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standalone_mode() {
        let config = RuntimeConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.platform_api_url.is_none());
        assert_eq!(config.stats_queue_max_size, 20);
    }
}
