//! Terminal implementations of the dialog, error display and navigation seams.

use std::path::PathBuf;

use async_trait::async_trait;
use controllers::{
    articles::Navigator, soap_teststep::SOAP_ADDRESS_INPUT, ErrorDisplay, ModalConfig,
    ModalOutcome, ModalService, UiErrorCategory,
};
use serde_json::Value;
use shared::error::HttpErrorResponse;
use tracing::{info, warn};

pub struct TerminalErrorDisplay;

impl ErrorDisplay for TerminalErrorDisplay {
    fn open_error_http_response_modal(&self, response: &HttpErrorResponse) {
        let category = UiErrorCategory::of(response);
        warn!(status = response.status, ?category, "showing error response");
        eprintln!(
            "{} (HTTP {}): {}",
            category.label(),
            response.status,
            response.message()
        );
        if category.requires_reauth() {
            eprintln!("Check the credentials configured for the Iron Test server.");
        }
    }
}

/// Stands in for the operation selection dialog: resolves with the contents
/// of a prepared request file, or is dismissed when there is none.
pub struct FileRequestModal {
    request_file: Option<PathBuf>,
}

impl FileRequestModal {
    pub fn new(request_file: Option<PathBuf>) -> Self {
        Self { request_file }
    }
}

/// JSON documents stay structured; anything else (a SOAP envelope) is raw text.
pub fn parse_generated_request(contents: String) -> Value {
    let trimmed = contents.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            return value;
        }
    }
    Value::String(contents)
}

#[async_trait]
impl ModalService for FileRequestModal {
    async fn open(&self, config: ModalConfig) -> ModalOutcome {
        let soap_address = config
            .resolved(SOAP_ADDRESS_INPUT)
            .and_then(Value::as_str)
            .unwrap_or("<none>");
        info!(
            controller = %config.controller,
            soap_address,
            "selecting soap operation"
        );

        let Some(path) = self.request_file.as_ref() else {
            return ModalOutcome::Dismissed;
        };
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => ModalOutcome::Resolved(parse_generated_request(contents)),
            Err(error) => {
                warn!(path = %path.display(), %error, "could not read generated request");
                ModalOutcome::Dismissed
            }
        }
    }
}

pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn go_to_path(&self, path: &str) {
        println!("-> #/{path}");
    }

    fn reload_current_state(&self) {
        println!("-> reload");
    }
}
