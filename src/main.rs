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

mod config;
mod status_view;

use clap::Parser;
use config::{AppConfig, BACKEND_URL_ENV};
use health_client::HealthClient;
use log::{info, warn};
use mimalloc::MiMalloc;
use status_view::StatusView;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Desktop front end for the GutIQ backend
#[derive(Parser, Debug)]
#[command(name = "gutiq-desktop", version, about)]
struct Cli {
    /// Backend origin, e.g. http://localhost:8000 (overrides config and env)
    #[arg(long, value_name = "URL")]
    backend_url: Option<String>,

    /// Health check timeout in seconds (default: wait indefinitely)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("Starting GutIQ Desktop...");

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        info!("Config file: {}", path.display());
    }
    config.apply_overrides(
        std::env::var(BACKEND_URL_ENV).ok(),
        cli.backend_url,
        cli.timeout,
    );

    let client = HealthClient::new(config.client_config())?;
    info!("Health check endpoint: {}", client.health_url());

    // Background probes are spawned from the UI thread, so keep a runtime entered.
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_title("GutIQ"),
        ..Default::default()
    };

    eframe::run_native(
        "GutIQ",
        options,
        Box::new(move |_cc| Ok(Box::new(GutIqApp::new(client)))),
    )?;

    Ok(())
}

#[derive(Debug)]
struct GutIqApp {
    status_view: StatusView,
}

impl GutIqApp {
    fn new(client: HealthClient) -> Self {
        Self {
            status_view: StatusView::new(client),
        }
    }
}

impl eframe::App for GutIqApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.status_view.show(ctx);
    }
}
