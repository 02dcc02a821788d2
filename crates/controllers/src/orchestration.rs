//! Dispatch of controller operations from UI actions.
//!
//! UI handlers never wait on a controller operation: the operation is spawned
//! and its result lands in controller state whenever it settles.

use std::future::Future;

use tokio::task::JoinHandle;

pub fn dispatch_ui_action<F>(action: &'static str, operation: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tracing::debug!(action, "dispatched ui action");
    tokio::spawn(async move {
        let output = operation.await;
        tracing::debug!(action, "ui action settled");
        output
    })
}
