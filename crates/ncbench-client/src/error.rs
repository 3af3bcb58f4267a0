//! Error types for the ncbench client.

use ncbench_core::CoreError;
use thiserror::Error;

/// Errors that can occur when submitting or polling a task.
///
/// Cancellation is deliberately absent: a user-initiated abort is a normal
/// outcome ([`crate::PollOutcome::Cancelled`]), not a failure.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad input, caught before any network call.
    #[error("{0}")]
    Validation(#[from] CoreError),

    /// Network/DNS/connection failure.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the task-creation endpoint.
    #[error("backend error {status}: {body}")]
    Backend { status: u16, body: String },

    /// 2xx response missing a required field.
    #[error("{0}")]
    Protocol(String),

    /// Non-2xx response from the status endpoint while polling.
    #[error("polling failed {status}: {body}")]
    PollHttp { status: u16, body: String },

    /// No terminal condition before the configured timeout.
    #[error("polling timeout after {waited_secs}s; the run is taking too long")]
    PollTimeout { waited_secs: u64 },

    /// Failed to read or write the persisted client state.
    #[error("state store error: {0}")]
    Store(String),
}

impl ClientError {
    /// HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } | Self::PollHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the error came from input validation and should be shown
    /// next to the offending field rather than as a request failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_mentions_status() {
        let err = ClientError::Backend {
            status: 502,
            body: "bad gateway".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("bad gateway"));
        assert_eq!(err.http_status(), Some(502));
    }

    #[test]
    fn test_validation_is_flagged() {
        let err = ClientError::from(CoreError::EmptyInstruction);
        assert!(err.is_validation());
        assert_eq!(err.http_status(), None);
    }
}
