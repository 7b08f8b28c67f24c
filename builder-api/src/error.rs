use builder_core::SubmissionError;
use thiserror::Error;

/// Error surface of the builder API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Transport failure: DNS, connect, TLS, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The token was missing or rejected.
    #[error("authentication rejected (status {status})")]
    Auth { status: u16 },

    /// The resource already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request task failed: {0}")]
    Join(String),
}

impl ApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ApiError::Auth { status },
            409 => ApiError::Conflict(body),
            _ => ApiError::Status { status, body },
        }
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let body = response.into_string().unwrap_or_default();
                ApiError::from_status(status, body)
            }
            ureq::Error::Transport(transport) => ApiError::Network(transport.to_string()),
        }
    }
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Conflict(_) => SubmissionError::NameTaken,
            ApiError::Auth { .. } => SubmissionError::Unauthorized,
            ApiError::Network(msg) => SubmissionError::Network(msg),
            ApiError::Status { status, body } => SubmissionError::Rejected {
                status,
                message: body,
            },
            ApiError::Decode(msg) | ApiError::Join(msg) => SubmissionError::Unexpected(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(401, ApiError::Auth { status: 401 })]
    #[case(403, ApiError::Auth { status: 403 })]
    #[case(409, ApiError::Conflict("exists".into()))]
    #[case(500, ApiError::Status { status: 500, body: "exists".into() })]
    fn status_classification(#[case] status: u16, #[case] expected: ApiError) {
        assert_eq!(ApiError::from_status(status, "exists".into()), expected);
    }

    #[test]
    fn conflict_maps_to_name_taken_submission() {
        let err: SubmissionError = ApiError::Conflict("exists".into()).into();
        assert_eq!(err, SubmissionError::NameTaken);
    }

    #[test]
    fn network_failure_keeps_its_message() {
        let err: SubmissionError = ApiError::Network("connection refused".into()).into();
        assert_eq!(err, SubmissionError::Network("connection refused".into()));
    }
}
