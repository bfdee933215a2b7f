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

//! Heading plus a backend status line fed by a one-shot health check.

use health_client::{FetchState, HealthClient, StatusProbe};
use log::debug;

/// Fixed heading text
pub const HEADING: &str = "GutIQ";

/// Prefix of the status line
pub const STATUS_LABEL: &str = "Backend status: ";

/// The status view. Owns its probe for as long as it is mounted.
#[derive(Debug)]
pub struct StatusView {
    client: HealthClient,
    probe: Option<StatusProbe>,
}

impl StatusView {
    pub fn new(client: HealthClient) -> Self {
        Self { client, probe: None }
    }

    /// Start the health check on first activation. Later calls are no-ops.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&mut self, ctx: &egui::Context) {
        if self.is_mounted() {
            return;
        }

        debug!("Mounting status view");
        let repaint_ctx = ctx.clone();
        self.probe = Some(StatusProbe::spawn(self.client.clone(), move || {
            repaint_ctx.request_repaint();
        }));
    }

    /// Cancel any in-flight check and drop its state.
    pub fn unmount(&mut self) {
        if let Some(probe) = self.probe.take() {
            debug!("Unmounting status view");
            probe.cancel();
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.probe.is_some()
    }

    /// Current result of the health check
    pub fn fetch_state(&self) -> FetchState {
        self.probe
            .as_ref()
            .map(StatusProbe::state)
            .unwrap_or_default()
    }

    pub fn heading(&self) -> &'static str {
        HEADING
    }

    /// Full status line, e.g. `Backend status: ok`
    pub fn status_line(&self) -> String {
        format!("{}{}", STATUS_LABEL, self.fetch_state().display_text())
    }

    /// Render one frame, mounting on the first call.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.mount(ctx);

        let heading = self.heading();
        let status_line = self.status_line();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(heading);
            ui.label(status_line);
        });
    }
}

impl Drop for StatusView {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use health_client::mock::{unreachable_url, MockBackend, MockReply};
    use health_client::ClientConfig;
    use std::time::Duration;

    fn view_for(base_url: String) -> StatusView {
        let client = HealthClient::new(ClientConfig {
            base_url,
            ..Default::default()
        })
        .unwrap();
        StatusView::new(client)
    }

    fn render(view: &mut StatusView, ctx: &egui::Context) {
        let _ = ctx.run(egui::RawInput::default(), |ctx| view.show(ctx));
    }

    async fn wait_settled(view: &StatusView) {
        for _ in 0..200 {
            if view.fetch_state().is_settled() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("health check did not settle");
    }

    #[tokio::test]
    async fn test_initial_render_shows_loading() {
        let backend = MockBackend::start(MockReply::Hang).await.unwrap();
        let mut view = view_for(backend.base_url());
        let ctx = egui::Context::default();

        render(&mut view, &ctx);

        assert!(view.is_mounted());
        assert_eq!(view.heading(), "GutIQ");
        assert_eq!(view.status_line(), "Backend status: loading");
    }

    #[tokio::test]
    async fn test_successful_response_updates_status() {
        let backend = MockBackend::start(MockReply::json(200, r#"{"status": "ok"}"#))
            .await
            .unwrap();
        let mut view = view_for(backend.base_url());
        let ctx = egui::Context::default();

        render(&mut view, &ctx);
        wait_settled(&view).await;
        render(&mut view, &ctx);

        assert_eq!(view.status_line(), "Backend status: ok");
    }

    #[tokio::test]
    async fn test_single_request_across_rerenders() {
        let backend = MockBackend::start(MockReply::json(200, r#"{"status": "ok"}"#))
            .await
            .unwrap();
        let mut view = view_for(backend.base_url());
        let ctx = egui::Context::default();

        render(&mut view, &ctx);
        wait_settled(&view).await;
        for _ in 0..5 {
            render(&mut view, &ctx);
        }
        view.mount(&ctx);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(backend.hits(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_is_silent() {
        let mut view = view_for(unreachable_url().await);
        let ctx = egui::Context::default();

        render(&mut view, &ctx);
        wait_settled(&view).await;
        render(&mut view, &ctx);

        assert!(view.fetch_state().failure().is_some());
        assert_eq!(view.status_line(), "Backend status: loading");
    }

    #[tokio::test]
    async fn test_error_status_is_silent() {
        let backend = MockBackend::start(MockReply::json(500, r#"{"status": "broken"}"#))
            .await
            .unwrap();
        let mut view = view_for(backend.base_url());
        let ctx = egui::Context::default();

        render(&mut view, &ctx);
        wait_settled(&view).await;

        assert!(view.fetch_state().failure().is_some());
        assert_eq!(view.status_line(), "Backend status: loading");
    }

    #[tokio::test]
    async fn test_missing_status_field_renders_undefined() {
        let backend = MockBackend::start(MockReply::json(200, "{}")).await.unwrap();
        let mut view = view_for(backend.base_url());
        let ctx = egui::Context::default();

        render(&mut view, &ctx);
        wait_settled(&view).await;

        assert_eq!(view.fetch_state(), FetchState::Ready(None));
        assert_eq!(view.status_line(), "Backend status: undefined");
    }

    #[tokio::test]
    async fn test_unmount_before_response() {
        let backend = MockBackend::start(MockReply::delayed(
            200,
            r#"{"status": "ok"}"#,
            Duration::from_millis(200),
        ))
        .await
        .unwrap();
        let mut view = view_for(backend.base_url());
        let ctx = egui::Context::default();

        render(&mut view, &ctx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        view.unmount();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!view.is_mounted());
        assert_eq!(view.fetch_state(), FetchState::Loading);
        assert_eq!(view.status_line(), "Backend status: loading");
    }

    #[tokio::test]
    async fn test_remount_issues_new_request() {
        let backend = MockBackend::start(MockReply::json(200, r#"{"status": "ok"}"#))
            .await
            .unwrap();
        let mut view = view_for(backend.base_url());
        let ctx = egui::Context::default();

        render(&mut view, &ctx);
        wait_settled(&view).await;
        view.unmount();
        render(&mut view, &ctx);
        wait_settled(&view).await;

        assert_eq!(backend.hits(), 2);
        assert_eq!(view.status_line(), "Backend status: ok");
    }
}
