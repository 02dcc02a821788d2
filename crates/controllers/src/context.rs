//! The parent editing session a test step controller works inside.
//!
//! Child controllers never reach into the parent's state directly. They get a
//! [`TeststepContext`], a narrow capability over the parent's test step: read
//! it, replace its request, ask for it to be saved.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use client_core::TeststepResource;
use shared::protocol::{Teststep, TeststepRequest};
use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::display::ErrorDisplay;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(2);

#[async_trait]
pub trait TeststepContext: Send + Sync {
    async fn endpoint_url(&self) -> Option<String>;
    async fn snapshot(&self) -> Teststep;
    async fn set_request(&self, request: TeststepRequest);
    /// Requests persistence of the test step. `immediate` bypasses the
    /// autosave delay the parent normally applies to edits.
    async fn update(&self, immediate: bool) -> UpdateOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Saved,
    /// Deferred to the autosave; its result is only reported to the error display.
    Scheduled,
    /// The save was rejected and the error was already shown.
    Failed,
}

struct SessionShared {
    teststep: RwLock<Teststep>,
    teststeps: Arc<dyn TeststepResource>,
    error_display: Arc<dyn ErrorDisplay>,
    save_seq: AtomicU64,
}

impl SessionShared {
    async fn save(&self) -> UpdateOutcome {
        let (seq, teststep) = {
            let guard = self.teststep.read().await;
            (self.save_seq.fetch_add(1, Ordering::SeqCst) + 1, guard.clone())
        };
        match self.teststeps.update(&teststep).await {
            Ok(saved) => {
                info!(seq, teststep_id = ?saved.id, "teststep saved");
                // Only the latest save may replace local state.
                let mut current = self.teststep.write().await;
                if self.save_seq.load(Ordering::SeqCst) == seq {
                    *current = saved;
                } else {
                    debug!(seq, "superseded save response not adopted");
                }
                UpdateOutcome::Saved
            }
            Err(error) => {
                warn!(seq, teststep_id = ?teststep.id, %error, "failed to save teststep");
                self.error_display
                    .open_error_http_response_modal(&error.to_error_response());
                UpdateOutcome::Failed
            }
        }
    }
}

/// Owns one test step for the duration of an editing session and debounces
/// its autosave.
pub struct TeststepSession {
    shared: Arc<SessionShared>,
    autosave_delay: Duration,
    pending_autosave: Mutex<Option<JoinHandle<()>>>,
}

impl TeststepSession {
    pub fn new(
        teststep: Teststep,
        teststeps: Arc<dyn TeststepResource>,
        error_display: Arc<dyn ErrorDisplay>,
    ) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                teststep: RwLock::new(teststep),
                teststeps,
                error_display,
                save_seq: AtomicU64::new(0),
            }),
            autosave_delay: DEFAULT_AUTOSAVE_DELAY,
            pending_autosave: Mutex::new(None),
        }
    }

    pub fn with_autosave_delay(mut self, autosave_delay: Duration) -> Self {
        self.autosave_delay = autosave_delay;
        self
    }

    pub async fn has_pending_autosave(&self) -> bool {
        self.pending_autosave
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[async_trait]
impl TeststepContext for TeststepSession {
    async fn endpoint_url(&self) -> Option<String> {
        self.shared.teststep.read().await.endpoint.url.clone()
    }

    async fn snapshot(&self) -> Teststep {
        self.shared.teststep.read().await.clone()
    }

    async fn set_request(&self, request: TeststepRequest) {
        self.shared.teststep.write().await.request = Some(request);
    }

    async fn update(&self, immediate: bool) -> UpdateOutcome {
        let mut pending = self.pending_autosave.lock().await;
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        if immediate {
            drop(pending);
            return self.shared.save().await;
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.autosave_delay;
        debug!(delay_ms = delay.as_millis() as u64, "teststep autosave scheduled");
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.save().await;
        }));
        UpdateOutcome::Scheduled
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
