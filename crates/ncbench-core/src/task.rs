//! Task request and snapshot types.

use crate::{is_valid_http_url, BenchId, CoreError, TaskId, TaskStatus};
use serde::Serialize;
use serde_json::Value;

/// A request to start an evaluation task. Exactly one variant is submitted
/// per request, and each variant has its own creation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskRequest {
    /// Evaluate a custom repository against a natural-language instruction.
    CustomRepo {
        /// Absolute http(s) URL of the repository.
        github_url: String,
        /// Natural-language description of the intended change.
        doc_change: String,
    },
    /// Run a pre-registered verified bench instance.
    Bench {
        #[serde(rename = "nocode_bench_id")]
        bench_id: BenchId,
    },
}

impl TaskRequest {
    /// Build a custom-repository request, trimming both fields.
    pub fn custom_repo(github_url: impl Into<String>, doc_change: impl Into<String>) -> Self {
        Self::CustomRepo {
            github_url: github_url.into().trim().to_owned(),
            doc_change: doc_change.into().trim().to_owned(),
        }
    }

    /// Build a verified-bench request, trimming the id.
    pub fn bench(bench_id: impl Into<String>) -> Self {
        Self::Bench {
            bench_id: BenchId::new(bench_id.into().trim()),
        }
    }

    /// Path segment of the creation endpoint for this variant.
    pub fn endpoint_kind(&self) -> &'static str {
        match self {
            Self::CustomRepo { .. } => "run-custom-repo",
            Self::Bench { .. } => "start-task",
        }
    }

    /// Check the submission preconditions.
    ///
    /// Runs before any network call; failures are field-level messages,
    /// never transport errors.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::CustomRepo {
                github_url,
                doc_change,
            } => {
                if !is_valid_http_url(github_url) {
                    return Err(CoreError::InvalidRepoUrl);
                }
                if doc_change.is_empty() {
                    return Err(CoreError::EmptyInstruction);
                }
                Ok(())
            }
            Self::Bench { bench_id } => {
                if bench_id.is_blank() {
                    return Err(CoreError::EmptyBenchId);
                }
                Ok(())
            }
        }
    }
}

/// One observation of a task's state, as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSnapshot {
    /// The task this snapshot belongs to.
    pub id: TaskId,

    /// Reported status code; `Unknown` when the field was absent.
    pub status: TaskStatus,

    /// Result artifact; `None` while work is outstanding. Becomes non-null
    /// exactly once, when the job produces its artifact.
    pub result: Option<Value>,

    /// Full response body, retained so viewers can render backend-specific
    /// fields such as `error_details`.
    pub raw: Value,
}

impl TaskSnapshot {
    /// Interpret a status-endpoint response body.
    ///
    /// Missing fields degrade rather than fail: no `status` means
    /// [`TaskStatus::Unknown`], no `result` (or an explicit null) means no
    /// artifact yet.
    pub fn from_body(id: TaskId, body: Value) -> Self {
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .map(TaskStatus::parse)
            .unwrap_or(TaskStatus::Unknown);
        let result = body
            .get("result")
            .filter(|v| !v.is_null())
            .cloned();
        Self {
            id,
            status,
            result,
            raw: body,
        }
    }

    /// True once polling can stop: a result is present or the status is a
    /// terminal failure that will never produce one.
    pub fn is_ready(&self) -> bool {
        self.result.is_some() || self.status.is_terminal_failure()
    }

    /// Backend diagnostic text for failed runs, if any.
    pub fn error_details(&self) -> Option<&str> {
        self.raw.get("error_details").and_then(Value::as_str)
    }
}
