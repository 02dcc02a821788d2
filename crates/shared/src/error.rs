use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the Iron Test server for failed resource calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// HTTP-shaped failure of a resource call, as handed to an error display.
///
/// A `status` of `0` means no HTTP response was received at all (connection
/// refused, timeout, undecodable body).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("HTTP {status} {status_text}")]
pub struct HttpErrorResponse {
    pub status: u16,
    pub status_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl HttpErrorResponse {
    pub const TRANSPORT_STATUS: u16 = 0;

    pub fn new(status: u16, status_text: impl Into<String>, body: Option<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: Self::TRANSPORT_STATUS,
            status_text: "transport failure".to_string(),
            body: Some(message.into()),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == Self::TRANSPORT_STATUS
    }

    /// Human readable reason: the `message` of an [`ApiError`] body when the
    /// server sent one, otherwise the raw body, otherwise the status text.
    pub fn message(&self) -> String {
        let Some(body) = self.body.as_deref().map(str::trim).filter(|b| !b.is_empty()) else {
            return self.status_text.clone();
        };
        match serde_json::from_str::<ApiError>(body) {
            Ok(api_error) => api_error.message,
            Err(_) => body.to_string(),
        }
    }
}
