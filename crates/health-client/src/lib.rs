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

//! Client library for the GutIQ backend health-check endpoint.
//!
//! The library is split into three layers that can be used on their own or
//! composed together:
//!
//! - **Client layer**: [`HealthClient`] issues `GET /health` and decodes the
//!   JSON payload into a [`HealthResponse`]
//! - **State layer**: [`FetchState`] is the tagged result a view renders from
//!   (`Loading`, `Ready`, `Failed`)
//! - **Probe layer**: [`StatusProbe`] runs one fetch in the background and
//!   writes the outcome into a liveness-guarded cell
//!
//! # Quick Start
//!
//! ```no_run
//! use health_client::{ClientConfig, HealthClient, StatusProbe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), health_client::HealthError> {
//!     let client = HealthClient::new(ClientConfig::default())?;
//!
//!     let mut probe = StatusProbe::spawn(client, || println!("status changed"));
//!     probe.wait().await;
//!
//!     println!("Backend status: {}", probe.state().display_text());
//!     Ok(())
//! }
//! ```
//!
//! # Client Layer Only
//!
//! ```no_run
//! use health_client::{ClientConfig, HealthClient};
//!
//! # async fn run() -> Result<(), health_client::HealthError> {
//! let client = HealthClient::new(ClientConfig {
//!     base_url: "http://10.0.0.5:8000".to_string(),
//!     ..Default::default()
//! })?;
//! let response = client.fetch().await?;
//! println!("{:?}", response.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod probe;
pub mod state;

pub use client::{
    ClientConfig, HealthClient, HealthError, HealthResponse, DEFAULT_BACKEND_URL, HEALTH_PATH,
};
pub use probe::StatusProbe;
pub use state::{FetchState, LOADING_TEXT, MISSING_STATUS_TEXT};
