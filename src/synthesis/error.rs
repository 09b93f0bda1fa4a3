use thiserror::Error;

/// Failures surfaced by the synthesis job client and the wait loop. HTTP
/// failures carry the response status and body so they can be shown to the
/// user verbatim; no call is retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("missing required input: {0}")]
    Validation(String),

    #[error("failed to submit batch avatar synthesis job (HTTP {status}): {body}")]
    Submission { status: u16, body: String },

    #[error("failed to get batch synthesis job (HTTP {status}): {body}")]
    Poll { status: u16, body: String },

    #[error("failed to list batch synthesis jobs (HTTP {status}): {body}")]
    List { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("batch synthesis job {job_id} failed")]
    JobFailed { job_id: String },

    #[error("timed out after {waited_secs}s waiting for job {job_id}")]
    Timeout { job_id: String, waited_secs: u64 },

    #[error("wait for job {job_id} was cancelled")]
    Cancelled { job_id: String },
}

impl ClientError {
    /// HTTP status carried by the error, if this was an HTTP-level failure.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Submission { status, .. }
            | ClientError::Poll { status, .. }
            | ClientError::List { status, .. } => Some(*status),
            _ => None,
        }
    }
}
