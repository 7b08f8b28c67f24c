use async_trait::async_trait;
use builder_core::Origin;

use crate::error::ApiError;

/// Asks the backend whether an origin name is free.
///
/// Implementations perform exactly one request per call; retry policy
/// belongs to the caller.
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    /// `Ok(true)` when `name` is free, `Ok(false)` when it is taken.
    async fn check_availability(&self, name: &str) -> Result<bool, ApiError>;
}

/// Origin endpoints used by the creation workflow.
#[async_trait]
pub trait OriginApi: Send + Sync {
    async fn create_origin(&self, name: &str, auth_token: &str) -> Result<Origin, ApiError>;

    async fn my_origins(&self, auth_token: &str) -> Result<Vec<Origin>, ApiError>;
}
