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

//! HTTP client for the backend health-check endpoint.

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Backend origin used when nothing else is configured.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Path of the health-check endpoint, relative to the backend origin.
pub const HEALTH_PATH: &str = "/health";

/// Errors that can occur while querying the health-check endpoint.
#[derive(Debug, Error)]
pub enum HealthError {
    /// Transport-level failure (connection refused, DNS, timeout, ...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status code.
    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    /// The body was not the expected JSON object.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Payload returned by `GET /health`.
///
/// Only `status` is read; any other fields are ignored. A missing or `null`
/// `status` is not an error and decodes to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    #[serde(default, deserialize_with = "status_as_text")]
    pub status: Option<String>,
}

/// Strings are kept verbatim; any other JSON value becomes its compact JSON
/// text, so `{"status": 1}` displays as `1`.
fn status_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(status)) => Some(status),
        Some(other) => Some(other.to_string()),
    })
}

/// Configuration for [`HealthClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://localhost:8000`.
    pub base_url: String,

    /// Overall request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout: None,
        }
    }
}

/// Async client for the health-check endpoint.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HealthClient {
    http: reqwest::Client,
    url: String,
}

impl HealthClient {
    /// Build a client for the configured backend.
    pub fn new(config: ClientConfig) -> Result<Self, HealthError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            url: health_url(&config.base_url),
        })
    }

    /// Full URL of the health-check endpoint.
    pub fn health_url(&self) -> &str {
        &self.url
    }

    /// Issue one `GET /health` and decode the response.
    pub async fn fetch(&self) -> Result<HealthResponse, HealthError> {
        debug!("GET {}", self.url);
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HealthError::Status(status));
        }

        let body = response.bytes().await?;
        let payload: HealthResponse = serde_json::from_slice(&body)?;
        debug!("Health response from {}: {:?}", self.url, payload);

        Ok(payload)
    }
}

fn health_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), HEALTH_PATH)
}
