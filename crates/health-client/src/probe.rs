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

//! One-shot background health check with a liveness-guarded result cell.
//!
//! A [`StatusProbe`] owns the only state cell its task writes to. Cancelling
//! the probe flips the cell to dead under the same lock the task takes before
//! writing, so once [`StatusProbe::cancel`] returns the task can neither
//! write a result nor fire its update hook.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::HealthClient;
use crate::state::FetchState;

#[derive(Debug)]
struct Slot {
    state: FetchState,
    live: bool,
}

type SharedSlot = Arc<Mutex<Slot>>;

fn lock(slot: &SharedSlot) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a single in-flight (or finished) health check.
///
/// Dropping the handle cancels the check.
#[derive(Debug)]
pub struct StatusProbe {
    slot: SharedSlot,
    cancel_token: CancellationToken,
    // Taken by the first `wait`; a finished handle must not be polled again.
    task: Option<JoinHandle<()>>,
}

impl StatusProbe {
    /// Spawn the check on the current tokio runtime.
    ///
    /// `on_update` runs once, after the result has been stored, and only if
    /// the probe is still live. It is invoked while the cell is locked, so it
    /// must not call back into this probe.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<F>(client: HealthClient, on_update: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let slot = Arc::new(Mutex::new(Slot {
            state: FetchState::Loading,
            live: true,
        }));
        let cancel_token = CancellationToken::new();

        info!("Starting health check against {}", client.health_url());
        let task = tokio::spawn(run_probe(
            client,
            slot.clone(),
            cancel_token.clone(),
            on_update,
        ));

        Self {
            slot,
            cancel_token,
            task: Some(task),
        }
    }

    /// Snapshot of the current result.
    pub fn state(&self) -> FetchState {
        lock(&self.slot).state.clone()
    }

    /// Stop the check. Any response arriving later is discarded.
    pub fn cancel(&self) {
        let mut slot = lock(&self.slot);
        if slot.live {
            debug!("Cancelling health check");
        }
        slot.live = false;
        self.cancel_token.cancel();
    }

    /// Whether the probe has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        !lock(&self.slot).live
    }

    /// Whether the background task has run to completion.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the background task to complete.
    ///
    /// Returns immediately if a previous call already waited for it.
    pub async fn wait(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(e) = task.await {
            error!("Health check task failed: {}", e);
        }
    }
}

impl Drop for StatusProbe {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run_probe<F>(
    client: HealthClient,
    slot: SharedSlot,
    cancel_token: CancellationToken,
    on_update: F,
) where
    F: FnOnce() + Send + 'static,
{
    let outcome = tokio::select! {
        () = cancel_token.cancelled() => {
            debug!("Health check cancelled before a response arrived");
            return;
        }
        outcome = client.fetch() => outcome,
    };

    settle(&slot, FetchState::from(outcome), on_update);
}

/// Store `next` and fire `on_update`, unless the probe was cancelled first.
///
/// Returns whether the result was stored.
fn settle<F>(slot: &SharedSlot, next: FetchState, on_update: F) -> bool
where
    F: FnOnce(),
{
    let mut slot = lock(slot);
    if !slot.live {
        debug!("Discarding health check result for a cancelled probe");
        return false;
    }

    match next.failure() {
        Some(reason) => warn!("Health check failed: {}", reason),
        None => info!("Backend status: {}", next.display_text()),
    }
    slot.state = next;
    on_update();
    true
}
