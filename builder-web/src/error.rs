use builder_core::SubmissionError;
use thiserror::Error;

use crate::origin_create::WorkflowState;

/// Errors surfaced by the origin creation workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// No session; the sign-in guard has already redirected.
    #[error("sign in to create an origin")]
    NotSignedIn,

    /// Submit was requested while the form was not in `Valid`.
    #[error("origin name is not ready to submit (state: {0})")]
    NotReady(WorkflowState),

    #[error("failed to create origin: {0}")]
    Submission(#[from] SubmissionError),

    /// The page was torn down.
    #[error("origin creation page is no longer mounted")]
    TornDown,
}
