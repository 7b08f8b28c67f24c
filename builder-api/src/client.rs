//! Blocking `ureq` client run on tokio's blocking pool.

use std::time::Duration;

use async_trait::async_trait;
use builder_core::{BuilderConfig, Origin};
use serde_json::json;

use crate::checker::{AvailabilityChecker, OriginApi};
use crate::error::ApiError;

/// HTTP client for the builder API.
///
/// The token given at construction authorizes availability checks; origin
/// endpoints take the token per call, as the dispatched action carries it.
#[derive(Clone)]
pub struct BuilderApiClient {
    base_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl BuilderApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.into(),
            token,
            agent,
        }
    }

    pub fn from_config(config: &BuilderConfig, token: Option<String>) -> Self {
        Self::new(config.api_url.clone(), token, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: &str, path: &str, token: Option<&str>) -> ureq::Request {
        let request = self.agent.request(method, &self.url(path));
        match token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    /// A `200` means the origin exists; a `404` means the name is free.
    fn check_availability_blocking(&self, name: &str) -> Result<bool, ApiError> {
        let path = format!("depot/origins/{name}");
        match self.request("GET", &path, self.token.as_deref()).call() {
            Ok(_) => Ok(false),
            Err(ureq::Error::Status(404, _)) => Ok(true),
            Err(err) => Err(err.into()),
        }
    }

    fn create_origin_blocking(&self, name: &str, token: &str) -> Result<Origin, ApiError> {
        let response = self
            .request("POST", "depot/origins", Some(token))
            .send_json(json!({ "name": name }))?;
        response
            .into_json::<Origin>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn my_origins_blocking(&self, token: &str) -> Result<Vec<Origin>, ApiError> {
        let response = self.request("GET", "user/origins", Some(token)).call()?;
        response
            .into_json::<Vec<Origin>>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

async fn run_blocking<T, F>(op: &'static str, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|err| ApiError::Join(format!("{op}: {err}")))?
}

#[async_trait]
impl AvailabilityChecker for BuilderApiClient {
    async fn check_availability(&self, name: &str) -> Result<bool, ApiError> {
        let client = self.clone();
        let name = name.to_string();
        let result = run_blocking("check_availability", move || {
            client.check_availability_blocking(&name)
        })
        .await;
        match &result {
            Ok(available) => tracing::debug!(available, "origin availability checked"),
            Err(err) => tracing::warn!(error = %err, "origin availability check failed"),
        }
        result
    }
}

#[async_trait]
impl OriginApi for BuilderApiClient {
    async fn create_origin(&self, name: &str, auth_token: &str) -> Result<Origin, ApiError> {
        let client = self.clone();
        let name = name.to_string();
        let token = auth_token.to_string();
        run_blocking("create_origin", move || {
            client.create_origin_blocking(&name, &token)
        })
        .await
    }

    async fn my_origins(&self, auth_token: &str) -> Result<Vec<Origin>, ApiError> {
        let client = self.clone();
        let token = auth_token.to_string();
        run_blocking("my_origins", move || client.my_origins_blocking(&token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let client = BuilderApiClient::new("http://localhost:9636/v1/", None, Duration::from_secs(1));
        assert_eq!(
            client.url("/depot/origins/core"),
            "http://localhost:9636/v1/depot/origins/core"
        );
        assert_eq!(client.url("user/origins"), "http://localhost:9636/v1/user/origins");
    }

    #[test]
    fn from_config_uses_api_url() {
        let config = BuilderConfig {
            api_url: "http://example.test/v1".into(),
            ..BuilderConfig::default()
        };
        let client = BuilderApiClient::from_config(&config, None);
        assert_eq!(client.base_url(), "http://example.test/v1");
    }
}
