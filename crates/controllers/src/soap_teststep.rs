//! SOAP test step controller: request generation from a WSDL operation,
//! invocation against the endpoint, and the assertions area signal.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use client_core::TeststepResource;
use serde_json::Value;
use shared::protocol::TeststepRequest;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::{
    context::{TeststepContext, UpdateOutcome},
    display::ErrorDisplay,
    events::TeststepEvent,
    modal::{ModalConfig, ModalOutcome, ModalService, ModalSize},
};

pub const SELECT_SOAP_OPERATION_TEMPLATE: &str =
    "/ui/views/teststeps/soap/select-soap-operation-modal.html";
pub const SELECT_SOAP_OPERATION_CONTROLLER: &str = "SelectSOAPOperationModalController";
pub const SELECT_SOAP_OPERATION_WINDOW_CLASS: &str = "select-soap-operation-modal";
/// Name of the read-only dialog input carrying the endpoint URL.
pub const SOAP_ADDRESS_INPUT: &str = "soapAddress";

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Scratch state for rendering the latest invocation. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TempData {
    pub soap_response: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestGeneration {
    Saved,
    /// The generated request was applied but persisting it failed.
    SaveFailed,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    Succeeded,
    Failed,
}

/// Operations currently awaiting their collaborator. The two counters are
/// independent: neither operation waits for or blocks the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerActivity {
    pub generating: usize,
    pub invoking: usize,
}

impl ControllerActivity {
    pub fn is_idle(&self) -> bool {
        self.generating == 0 && self.invoking == 0
    }
}

struct ActivityGuard<'a>(&'a AtomicUsize);

impl<'a> ActivityGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn select_soap_operation_modal(soap_address: Option<String>) -> ModalConfig {
    ModalConfig::new(
        SELECT_SOAP_OPERATION_TEMPLATE,
        SELECT_SOAP_OPERATION_CONTROLLER,
    )
    .size(ModalSize::Large)
    .window_class(SELECT_SOAP_OPERATION_WINDOW_CLASS)
    .resolve(
        SOAP_ADDRESS_INPUT,
        soap_address.map(Value::String).unwrap_or(Value::Null),
    )
}

pub struct SoapTeststepController {
    context: Arc<dyn TeststepContext>,
    teststeps: Arc<dyn TeststepResource>,
    modal: Arc<dyn ModalService>,
    error_display: Arc<dyn ErrorDisplay>,
    temp_data: RwLock<TempData>,
    show_assertions_area: AtomicBool,
    events: broadcast::Sender<TeststepEvent>,
    invocation_seq: AtomicU64,
    generating: AtomicUsize,
    invoking: AtomicUsize,
}

impl SoapTeststepController {
    pub fn new(
        context: Arc<dyn TeststepContext>,
        teststeps: Arc<dyn TeststepResource>,
        modal: Arc<dyn ModalService>,
        error_display: Arc<dyn ErrorDisplay>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            context,
            teststeps,
            modal,
            error_display,
            temp_data: RwLock::new(TempData::default()),
            show_assertions_area: AtomicBool::new(false),
            events,
            invocation_seq: AtomicU64::new(0),
            generating: AtomicUsize::new(0),
            invoking: AtomicUsize::new(0),
        }
    }

    /// Opens the operation selection dialog for the test step's endpoint. A
    /// resolved dialog replaces the test step request and saves it right away;
    /// a dismissed one changes nothing. A failed save keeps the new request.
    pub async fn generate_request(&self) -> RequestGeneration {
        let _activity = ActivityGuard::enter(&self.generating);
        let soap_address = self.context.endpoint_url().await;
        debug!(soap_address = ?soap_address, "opening select soap operation dialog");

        match self
            .modal
            .open(select_soap_operation_modal(soap_address))
            .await
        {
            ModalOutcome::Resolved(request) => {
                self.context
                    .set_request(TeststepRequest::from(request))
                    .await;
                match self.context.update(true).await {
                    UpdateOutcome::Failed => {
                        warn!("generated request could not be saved");
                        RequestGeneration::SaveFailed
                    }
                    UpdateOutcome::Saved | UpdateOutcome::Scheduled => {
                        info!("generated request saved to teststep");
                        RequestGeneration::Saved
                    }
                }
            }
            ModalOutcome::Dismissed => {
                debug!("select soap operation dialog dismissed");
                RequestGeneration::Dismissed
            }
        }
    }

    /// Runs the test step once. Overlapping invocations are not guarded: each
    /// applies its own result when it arrives.
    pub async fn invoke(&self) -> InvocationOutcome {
        let _activity = ActivityGuard::enter(&self.invoking);
        let sequence = self.invocation_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let teststep = self.context.snapshot().await;
        debug!(sequence, teststep_id = ?teststep.id, "invoking teststep");

        match self.teststeps.run(&teststep).await {
            Ok(response) => {
                self.temp_data.write().await.soap_response = response.http_response_body;
                debug!(sequence, "teststep invocation completed");
                InvocationOutcome::Succeeded
            }
            Err(error) => {
                warn!(sequence, %error, "teststep invocation failed");
                self.error_display
                    .open_error_http_response_modal(&error.to_error_response());
                InvocationOutcome::Failed
            }
        }
    }

    pub fn assertions_area_loaded(&self) {
        let event = TeststepEvent::AssertionsAreaLoaded;
        // No subscribed child region is not an error.
        let receivers = self.events.send(event).unwrap_or(0);
        debug!(event = event.name(), receivers, "notified child regions");
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TeststepEvent> {
        self.events.subscribe()
    }

    pub async fn temp_data(&self) -> TempData {
        self.temp_data.read().await.clone()
    }

    pub fn show_assertions_area(&self) -> bool {
        self.show_assertions_area.load(Ordering::SeqCst)
    }

    pub fn set_show_assertions_area(&self, show: bool) {
        self.show_assertions_area.store(show, Ordering::SeqCst);
    }

    pub fn activity(&self) -> ControllerActivity {
        ControllerActivity {
            generating: self.generating.load(Ordering::SeqCst),
            invoking: self.invoking.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
#[path = "tests/soap_teststep_tests.rs"]
mod tests;
