//! Builder core library: domain types, application state store, config and
//! session persistence, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`store`]: [`AppStore`], the single dispatch-driven state container
//! - [`config`]: `~/.builder/config.yaml`
//! - [`session`]: `~/.builder/session.yaml`
//! - [`error`]: [`ConfigError`], [`ValidationError`], [`SubmissionError`]

pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use config::BuilderConfig;
pub use error::{ConfigError, SubmissionError, ValidationError};
pub use store::{Action, AppState, AppStore, OriginUiState, OriginsState, Subscription};
pub use types::{
    Notification, NotificationKind, Origin, OriginName, Session, ORIGIN_NAME_MAX_LEN,
};
