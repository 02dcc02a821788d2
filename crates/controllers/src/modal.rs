//! Modal dialog seam. The dialog's own UI is opaque; controllers only see the
//! configuration they pass in and whether the dialog resolved or was dismissed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl ModalSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "sm",
            Self::Medium => "md",
            Self::Large => "lg",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalConfig {
    pub template_url: String,
    pub controller: String,
    pub size: ModalSize,
    pub window_class: Option<String>,
    /// Named read-only inputs made available to the dialog.
    pub resolve: BTreeMap<String, Value>,
}

impl ModalConfig {
    pub fn new(template_url: impl Into<String>, controller: impl Into<String>) -> Self {
        Self {
            template_url: template_url.into(),
            controller: controller.into(),
            size: ModalSize::default(),
            window_class: None,
            resolve: BTreeMap::new(),
        }
    }

    pub fn size(mut self, size: ModalSize) -> Self {
        self.size = size;
        self
    }

    pub fn window_class(mut self, window_class: impl Into<String>) -> Self {
        self.window_class = Some(window_class.into());
        self
    }

    pub fn resolve(mut self, name: impl Into<String>, value: Value) -> Self {
        self.resolve.insert(name.into(), value);
        self
    }

    pub fn resolved(&self, name: &str) -> Option<&Value> {
        self.resolve.get(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutcome {
    Resolved(Value),
    /// Closed without a result. A normal outcome, never an error.
    Dismissed,
}

#[async_trait]
pub trait ModalService: Send + Sync {
    async fn open(&self, config: ModalConfig) -> ModalOutcome;
}
