//! Backend task status codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of an evaluation task as reported by the backend.
///
/// This is an open enumeration: the backend may report strings the client
/// has never seen, and those pass through as [`TaskStatus::Other`] rather
/// than failing deserialization. An absent status field maps to
/// [`TaskStatus::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Task created, not yet picked up.
    #[default]
    Pending,
    /// Task actively executing.
    Running,
    /// Task failed.
    Failed,
    /// Backend-side error.
    Error,
    /// The generated edits did not pass the project's tests.
    FailedTest,
    /// The backend response carried no status field.
    Unknown,
    /// Any backend-defined status string not listed above.
    Other(String),
}

impl TaskStatus {
    /// Parse a backend status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "PENDING" => Self::Pending,
            "RUNNING" => Self::Running,
            "FAILED" => Self::Failed,
            "ERROR" => Self::Error,
            "FAILED_TEST" => Self::FailedTest,
            "UNKNOWN" => Self::Unknown,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The backend's wire string for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Failed => "FAILED",
            Self::Error => "ERROR",
            Self::FailedTest => "FAILED_TEST",
            Self::Unknown => "UNKNOWN",
            Self::Other(s) => s,
        }
    }

    /// Returns true for the fixed terminal-failure codes.
    ///
    /// A task in one of these states will never produce a result payload,
    /// so pollers stop waiting and surface the failure as-is.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Error | Self::FailedTest)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_codes() {
        assert_eq!(TaskStatus::parse("PENDING"), TaskStatus::Pending);
        assert_eq!(TaskStatus::parse("RUNNING"), TaskStatus::Running);
        assert_eq!(TaskStatus::parse("FAILED_TEST"), TaskStatus::FailedTest);
    }

    #[test]
    fn test_unrecognized_passes_through() {
        let status = TaskStatus::parse("QUEUED_FOR_REVIEW");
        assert_eq!(status, TaskStatus::Other("QUEUED_FOR_REVIEW".to_owned()));
        assert_eq!(status.as_str(), "QUEUED_FOR_REVIEW");
        assert!(!status.is_terminal_failure());
    }

    #[test]
    fn test_terminal_failure_codes() {
        assert!(TaskStatus::Failed.is_terminal_failure());
        assert!(TaskStatus::Error.is_terminal_failure());
        assert!(TaskStatus::FailedTest.is_terminal_failure());
        assert!(!TaskStatus::Pending.is_terminal_failure());
        assert!(!TaskStatus::Running.is_terminal_failure());
        assert!(!TaskStatus::Unknown.is_terminal_failure());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&TaskStatus::FailedTest).unwrap();
        assert_eq!(json, "\"FAILED_TEST\"");
        let back: TaskStatus = serde_json::from_str("\"SCORING\"").unwrap();
        assert_eq!(back, TaskStatus::Other("SCORING".to_owned()));
    }
}
