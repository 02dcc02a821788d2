//! Controller layer: headless presentation controllers for test step editing
//! and article management, plus the collaborator seams they drive.

pub mod articles;
pub mod context;
pub mod display;
pub mod events;
pub mod modal;
pub mod orchestration;
pub mod soap_teststep;

pub use articles::{ArticlesController, ArticlesError, ArticlesViewModel, Navigator};
pub use context::{TeststepContext, TeststepSession, UpdateOutcome};
pub use display::{pretty_print_json_or_xml, ErrorDisplay};
pub use events::{TeststepEvent, UiErrorCategory};
pub use modal::{ModalConfig, ModalOutcome, ModalService, ModalSize};
pub use soap_teststep::{
    ControllerActivity, InvocationOutcome, RequestGeneration, SoapTeststepController, TempData,
};
