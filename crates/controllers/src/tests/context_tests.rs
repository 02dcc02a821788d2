use super::*;
use client_core::ResourceError;
use shared::{
    domain::{TestcaseId, TeststepId},
    error::HttpErrorResponse,
    protocol::{Endpoint, InvocationResponse},
};
use std::{collections::VecDeque, sync::Mutex as StdMutex};
use tokio::sync::oneshot;

struct RecordingTeststeps {
    saved: Mutex<Vec<Teststep>>,
    fail_with: Option<u16>,
}

impl RecordingTeststeps {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            saved: Mutex::new(Vec::new()),
            fail_with: None,
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            saved: Mutex::new(Vec::new()),
            fail_with: Some(status),
        })
    }

    async fn save_count(&self) -> usize {
        self.saved.lock().await.len()
    }
}

#[async_trait]
impl TeststepResource for RecordingTeststeps {
    async fn get(
        &self,
        _testcase_id: TestcaseId,
        _teststep_id: TeststepId,
    ) -> Result<Teststep, ResourceError> {
        Err(ResourceError::MissingId("teststep"))
    }

    async fn update(&self, teststep: &Teststep) -> Result<Teststep, ResourceError> {
        self.saved.lock().await.push(teststep.clone());
        if let Some(status) = self.fail_with {
            return Err(ResourceError::Status(HttpErrorResponse::new(
                status,
                "Bad Request",
                Some(r#"{"code":400,"message":"name must not be empty"}"#.to_string()),
            )));
        }
        let mut saved = teststep.clone();
        saved.description = Some("saved by server".to_string());
        Ok(saved)
    }

    async fn run(&self, _teststep: &Teststep) -> Result<InvocationResponse, ResourceError> {
        Ok(InvocationResponse::default())
    }
}

/// Holds every save until the test releases it, echoing the saved test step.
struct GatedTeststeps {
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    saved: Mutex<Vec<Teststep>>,
}

impl GatedTeststeps {
    fn new(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<()>>) {
        let (senders, receivers): (Vec<_>, VecDeque<_>) =
            (0..count).map(|_| oneshot::channel()).unzip();
        let fake = Arc::new(Self {
            gates: Mutex::new(receivers),
            saved: Mutex::new(Vec::new()),
        });
        (fake, senders)
    }
}

#[async_trait]
impl TeststepResource for GatedTeststeps {
    async fn get(
        &self,
        _testcase_id: TestcaseId,
        _teststep_id: TeststepId,
    ) -> Result<Teststep, ResourceError> {
        Err(ResourceError::MissingId("teststep"))
    }

    async fn update(&self, teststep: &Teststep) -> Result<Teststep, ResourceError> {
        let gate = self
            .gates
            .lock()
            .await
            .pop_front()
            .expect("unexpected save");
        self.saved.lock().await.push(teststep.clone());
        gate.await.expect("save gate dropped");
        Ok(teststep.clone())
    }

    async fn run(&self, _teststep: &Teststep) -> Result<InvocationResponse, ResourceError> {
        Ok(InvocationResponse::default())
    }
}

#[derive(Default)]
struct RecordingErrorDisplay {
    shown: StdMutex<Vec<HttpErrorResponse>>,
}

impl ErrorDisplay for RecordingErrorDisplay {
    fn open_error_http_response_modal(&self, response: &HttpErrorResponse) {
        self.shown.lock().expect("lock").push(response.clone());
    }
}

fn sample_teststep() -> Teststep {
    Teststep {
        id: Some(TeststepId(12)),
        testcase_id: Some(TestcaseId(3)),
        name: "get weather".to_string(),
        step_type: "SOAP".to_string(),
        description: None,
        endpoint: Endpoint {
            url: Some("http://localhost:8089/weather".to_string()),
            ..Endpoint::default()
        },
        request: None,
        created: None,
        updated: None,
    }
}

fn session(
    teststeps: Arc<RecordingTeststeps>,
    errors: Arc<RecordingErrorDisplay>,
) -> TeststepSession {
    TeststepSession::new(sample_teststep(), teststeps, errors)
}

#[tokio::test]
async fn exposes_endpoint_url_and_request_edits() {
    let session = session(
        RecordingTeststeps::ok(),
        Arc::new(RecordingErrorDisplay::default()),
    );

    assert_eq!(
        session.endpoint_url().await.as_deref(),
        Some("http://localhost:8089/weather")
    );
    session
        .set_request(TeststepRequest::Raw("<Envelope/>".to_string()))
        .await;
    assert_eq!(
        session.snapshot().await.request,
        Some(TeststepRequest::Raw("<Envelope/>".to_string()))
    );
}

#[tokio::test]
async fn immediate_update_saves_now_and_adopts_server_copy() {
    let teststeps = RecordingTeststeps::ok();
    let session = session(teststeps.clone(), Arc::new(RecordingErrorDisplay::default()));

    session
        .set_request(TeststepRequest::Raw("<Envelope/>".to_string()))
        .await;
    assert_eq!(session.update(true).await, UpdateOutcome::Saved);

    let saved = teststeps.saved.lock().await.clone();
    assert_eq!(saved.len(), 1);
    assert_eq!(
        saved[0].request,
        Some(TeststepRequest::Raw("<Envelope/>".to_string()))
    );
    assert_eq!(
        session.snapshot().await.description.as_deref(),
        Some("saved by server")
    );
    assert!(!session.has_pending_autosave().await);
}

#[tokio::test(start_paused = true)]
async fn deferred_updates_are_debounced() {
    let teststeps = RecordingTeststeps::ok();
    let session = session(teststeps.clone(), Arc::new(RecordingErrorDisplay::default()));

    assert_eq!(session.update(false).await, UpdateOutcome::Scheduled);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(teststeps.save_count().await, 0);

    session.update(false).await;
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(teststeps.save_count().await, 0);
    assert!(session.has_pending_autosave().await);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(teststeps.save_count().await, 1);
    assert!(!session.has_pending_autosave().await);
}

#[tokio::test(start_paused = true)]
async fn immediate_update_cancels_pending_autosave() {
    let teststeps = RecordingTeststeps::ok();
    let session = session(teststeps.clone(), Arc::new(RecordingErrorDisplay::default()))
        .with_autosave_delay(Duration::from_millis(500));

    session.update(false).await;
    session.update(true).await;
    assert_eq!(teststeps.save_count().await, 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(teststeps.save_count().await, 1);
}

#[tokio::test]
async fn failed_save_goes_to_error_display_and_keeps_local_copy() {
    let teststeps = RecordingTeststeps::failing(400);
    let errors = Arc::new(RecordingErrorDisplay::default());
    let session = session(teststeps, errors.clone());

    session
        .set_request(TeststepRequest::Raw("<Envelope/>".to_string()))
        .await;
    assert_eq!(session.update(true).await, UpdateOutcome::Failed);

    let shown = errors.shown.lock().expect("lock").clone();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].status, 400);
    assert_eq!(shown[0].message(), "name must not be empty");

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.description, None);
    assert_eq!(
        snapshot.request,
        Some(TeststepRequest::Raw("<Envelope/>".to_string()))
    );
}

#[tokio::test]
async fn superseded_save_response_does_not_revert_newer_request() {
    let (teststeps, mut gates) = GatedTeststeps::new(2);
    let session = Arc::new(TeststepSession::new(
        sample_teststep(),
        teststeps.clone(),
        Arc::new(RecordingErrorDisplay::default()),
    ));

    session
        .set_request(TeststepRequest::Raw("<First/>".to_string()))
        .await;
    let first = tokio::spawn({
        let session = session.clone();
        async move { session.update(true).await }
    });
    while teststeps.saved.lock().await.len() < 1 {
        tokio::task::yield_now().await;
    }

    session
        .set_request(TeststepRequest::Raw("<Second/>".to_string()))
        .await;
    let second = tokio::spawn({
        let session = session.clone();
        async move { session.update(true).await }
    });
    while teststeps.saved.lock().await.len() < 2 {
        tokio::task::yield_now().await;
    }

    let first_gate = gates.remove(0);
    let _ = gates.remove(0).send(());
    assert_eq!(second.await.expect("join"), UpdateOutcome::Saved);
    let _ = first_gate.send(());
    assert_eq!(first.await.expect("join"), UpdateOutcome::Saved);

    assert_eq!(
        session.snapshot().await.request,
        Some(TeststepRequest::Raw("<Second/>".to_string()))
    );
}
