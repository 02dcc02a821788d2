//! Controller-to-child events and error classification for error displays.

use shared::error::HttpErrorResponse;

/// Payload-less signals sent from a test step controller to the child regions
/// that subscribed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeststepEvent {
    AssertionsAreaLoaded,
}

impl TeststepEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AssertionsAreaLoaded => "assertionsAreaLoaded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    NotFound,
    Validation,
    Server,
    Unknown,
}

impl UiErrorCategory {
    pub fn of(response: &HttpErrorResponse) -> Self {
        match response.status {
            HttpErrorResponse::TRANSPORT_STATUS => Self::Transport,
            401 | 403 => Self::Auth,
            404 => Self::NotFound,
            400..=499 => Self::Validation,
            500..=599 => Self::Server,
            _ => Self::Unknown,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        *self == Self::Auth
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auth => "Authentication error",
            Self::Transport => "Server unreachable",
            Self::NotFound => "Not found",
            Self::Validation => "Request rejected",
            Self::Server => "Server error",
            Self::Unknown => "Unexpected response",
        }
    }
}
