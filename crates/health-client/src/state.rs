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

//! Tagged result of a health check, as seen by a view.

use crate::client::{HealthError, HealthResponse};

/// Text shown while no successful response has arrived.
pub const LOADING_TEXT: &str = "loading";

/// Text shown when the backend answered without a `status` field.
pub const MISSING_STATUS_TEXT: &str = "undefined";

/// Outcome of the one-shot health check.
///
/// Starts as `Loading` and moves at most once, to `Ready` or `Failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Loading,

    /// Backend answered; `None` means the payload had no `status` field.
    Ready(Option<String>),

    /// The request or decode failed. Rendered the same as `Loading`.
    Failed(String),
}

impl FetchState {
    /// The status string to display after `Backend status: `.
    ///
    /// Failures are silent here and keep the loading text.
    pub fn display_text(&self) -> &str {
        match self {
            FetchState::Loading | FetchState::Failed(_) => LOADING_TEXT,
            FetchState::Ready(Some(status)) => status,
            FetchState::Ready(None) => MISSING_STATUS_TEXT,
        }
    }

    /// Whether the state has left `Loading`.
    pub fn is_settled(&self) -> bool {
        !matches!(self, FetchState::Loading)
    }

    /// Failure reason, if the check failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            FetchState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<Result<HealthResponse, HealthError>> for FetchState {
    fn from(outcome: Result<HealthResponse, HealthError>) -> Self {
        match outcome {
            Ok(response) => FetchState::Ready(response.status),
            Err(e) => FetchState::Failed(e.to_string()),
        }
    }
}
