//! Async actions: call the API, dispatch the resulting transitions.

use builder_api::{ApiError, OriginApi};
use builder_core::{Action, AppStore, Notification, Origin, SubmissionError};

/// Payload of the `createOrigin` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrigin {
    pub name: String,
    pub auth_token: String,
    pub is_first_origin: bool,
}

/// Create an origin.
///
/// Dispatches `SetOriginCreating(true)`, then on success `OriginCreated`,
/// on failure `OriginCreateFailed` plus a danger notification, and in every
/// case `SetOriginCreating(false)` last, so `creating` never stays set.
pub async fn create_origin(
    store: &AppStore,
    api: &dyn OriginApi,
    request: CreateOrigin,
) -> Result<Origin, SubmissionError> {
    store.dispatch(Action::SetOriginCreating(true));
    let creating = CreatingFlag { store };
    tracing::info!(
        origin = %request.name,
        is_first_origin = request.is_first_origin,
        "creating origin"
    );

    let result = api
        .create_origin(&request.name, &request.auth_token)
        .await
        .map_err(SubmissionError::from);

    match &result {
        Ok(origin) => {
            store.dispatch(Action::OriginCreated {
                origin: origin.clone(),
                is_first_origin: request.is_first_origin,
            });
            tracing::info!(origin = %origin.name, "origin created");
        }
        Err(err) => {
            store.dispatch(Action::OriginCreateFailed(err.clone()));
            store.dispatch(Action::AddNotification(Notification::danger(
                "Failed to create origin",
                err.to_string(),
            )));
            tracing::warn!(origin = %request.name, error = %err, "origin creation failed");
        }
    }
    drop(creating);
    result
}

/// Clears `creating` when dropped, including when the submission future is
/// dropped mid-request.
struct CreatingFlag<'a> {
    store: &'a AppStore,
}

impl Drop for CreatingFlag<'_> {
    fn drop(&mut self) {
        self.store.dispatch(Action::SetOriginCreating(false));
    }
}

/// Refresh `origins.mine` for the signed-in user.
pub async fn fetch_my_origins(
    store: &AppStore,
    api: &dyn OriginApi,
    auth_token: &str,
) -> Result<Vec<Origin>, ApiError> {
    let origins = api.my_origins(auth_token).await?;
    tracing::debug!(count = origins.len(), "fetched my origins");
    store.dispatch(Action::SetMyOrigins(origins.clone()));
    Ok(origins)
}
