//! Builder HTTP API: the availability checker and origin endpoints used by
//! the web workflows.

mod checker;
mod client;
mod error;

pub use checker::{AvailabilityChecker, OriginApi};
pub use client::BuilderApiClient;
pub use error::ApiError;
