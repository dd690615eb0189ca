//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `ExamService` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamServiceError {
    #[error("exam service request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error("exam service response could not be decoded: {0}")]
    Decode(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the exam session controller.
///
/// Persistence failures never appear here from the normal mutation paths:
/// store reads degrade to a fresh session and store writes are swallowed
/// with a warning. `Storage` only surfaces from explicit store management.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The exam definition could not be fetched. Fatal to session start;
    /// callers may retry by bootstrapping again.
    #[error("failed to load exam: {0}")]
    Load(#[source] ExamServiceError),

    /// A submission is already in flight (or the session was already
    /// submitted); the call was a no-op.
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    /// The exam service rejected or failed the submission. The session keeps
    /// its pre-submit state and persisted progress; retrying is allowed.
    #[error("submission failed: {0}")]
    Submission(#[source] ExamServiceError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
