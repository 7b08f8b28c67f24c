//! Builder web workflows: origin creation and the copy-to-clipboard widget.
//!
//! Components own a [`ScopedTaskSet`]; everything they defer (debounced
//! availability checks, the first-origin nudge, copy feedback timers) runs
//! inside it and is aborted on teardown.

pub mod actions;
pub mod clipboard;
pub mod copyable;
mod error;
pub mod form;
pub mod origin_create;
pub mod router;
pub mod tasks;
pub mod validator;

pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use copyable::{CopyTimings, Copyable};
pub use error::WorkflowError;
pub use form::{FieldStatus, NameField, SharedField};
pub use origin_create::{Collaborators, OriginCreatePage, WorkflowConfig, WorkflowState};
pub use router::{RequireSignIn, Router, SignInGuard, StoreRouter, SIGN_IN_ROUTE};
pub use tasks::{ScopedTaskSet, TaskHandle};
pub use validator::AsyncValidator;

/// Install the global `tracing` subscriber (`RUST_LOG`, default `info`).
/// Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(crate) fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
