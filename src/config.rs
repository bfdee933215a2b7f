// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent settings are stored as TOML through `confy`. The backend origin
//! can be overridden per run from the environment or the command line; the
//! command line wins over the environment, which wins over the file.

use std::time::Duration;

use health_client::{ClientConfig, DEFAULT_BACKEND_URL};
use serde::{Deserialize, Serialize};

/// Name used for the config directory
pub const APP_NAME: &str = "gutiq-desktop";

/// Environment variable overriding the configured backend origin
pub const BACKEND_URL_ENV: &str = "GUTIQ_BACKEND_URL";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Backend origin the health check is sent to
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Request timeout in seconds (unset waits indefinitely)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Initial window width in pixels
    #[serde(default = "default_window_width")]
    pub window_width: f32,

    /// Initial window height in pixels
    #[serde(default = "default_window_height")]
    pub window_height: f32,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_window_width() -> f32 {
    480.0
}

fn default_window_height() -> f32 {
    240.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            backend_url: default_backend_url(),
            request_timeout_secs: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, "config")
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, "config")
    }

    /// Apply per-run overrides on top of the file values.
    ///
    /// Blank values are ignored so an empty env var does not clear the origin.
    pub fn apply_overrides(
        &mut self,
        env_backend_url: Option<String>,
        cli_backend_url: Option<String>,
        cli_timeout_secs: Option<u64>,
    ) {
        let backend_url = cli_backend_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| env_backend_url.filter(|url| !url.trim().is_empty()));
        if let Some(url) = backend_url {
            self.backend_url = url.trim().to_string();
        }

        if cli_timeout_secs.is_some() {
            self.request_timeout_secs = cli_timeout_secs;
        }
    }

    /// Client settings derived from this configuration
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.backend_url.clone(),
            // A zero timeout would fail every request; treat it as unset.
            request_timeout: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.client_config().request_timeout, None);
    }

    #[test]
    fn test_overrides_precedence() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some("http://env:8000".to_string()), None, None);
        assert_eq!(config.backend_url, "http://env:8000");

        let mut config = AppConfig::default();
        config.apply_overrides(
            Some("http://env:8000".to_string()),
            Some("http://cli:9000".to_string()),
            Some(5),
        );
        assert_eq!(config.backend_url, "http://cli:9000");
        assert_eq!(
            config.client_config().request_timeout,
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_blank_env_keeps_file_value() {
        let mut config = AppConfig {
            backend_url: "http://from-file:8000".to_string(),
            ..Default::default()
        };
        config.apply_overrides(Some("  ".to_string()), None, None);
        assert_eq!(config.backend_url, "http://from-file:8000");
    }

    #[test]
    fn test_zero_timeout_is_unset() {
        let config = AppConfig {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.client_config().request_timeout, None);
    }
}
