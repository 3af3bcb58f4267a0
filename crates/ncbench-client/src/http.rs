//! HTTP client for the evaluation backend's REST endpoints.

use ncbench_core::{normalize_origin, TaskId, TaskRequest, TaskSnapshot};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ClientError;
use crate::store::TaskStore;

/// HTTP client bound to one backend origin.
///
/// Response bodies are always read as text first so error bodies are never
/// silently dropped; JSON parsing happens only on non-empty bodies.
pub struct ApiClient {
    inner: reqwest::Client,
    origin: String,
}

impl ApiClient {
    /// Create a client for the given origin. The origin is normalized
    /// (default when empty, trailing slashes and `/api` suffix stripped).
    pub fn new(origin: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            origin: normalize_origin(origin),
        }
    }

    /// The normalized origin this client talks to.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn creation_url(&self, kind: &str) -> String {
        format!("{}/api/tasks/{}/", self.origin, kind)
    }

    fn status_url(&self, id: &TaskId) -> String {
        format!("{}/api/tasks/{}/", self.origin, id)
    }

    /// Submit a task request and return the backend-assigned id.
    ///
    /// Validates first, POSTs the variant body to the variant's endpoint,
    /// and on success unconditionally records the id (and bench id, for
    /// bench runs) in `store` before returning, so a restart during polling
    /// can recover the reference.
    pub async fn submit(
        &self,
        request: &TaskRequest,
        store: &dyn TaskStore,
    ) -> Result<TaskId, ClientError> {
        request.validate().map_err(ClientError::Validation)?;

        let url = self.creation_url(request.endpoint_kind());
        debug!(url = %url, kind = request.endpoint_kind(), "submitting task");

        let response = self.inner.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let data = parse_json_body(&body)?;
        let id = data
            .get("id")
            .and_then(id_field_to_string)
            .ok_or_else(|| ClientError::Protocol("missing task id in response".to_owned()))?;
        let id = TaskId::new(id);

        store.set_last_task_id(&id)?;
        if let TaskRequest::Bench { bench_id } = request {
            store.set_last_bench_id(bench_id)?;
        }

        info!(task_id = %id, "task created");
        Ok(id)
    }

    /// Fetch one status snapshot for a task.
    ///
    /// A 2xx response with an empty body is treated as an empty object;
    /// non-2xx becomes [`ClientError::PollHttp`] carrying status and body.
    pub async fn fetch_status(&self, id: &TaskId) -> Result<TaskSnapshot, ClientError> {
        let url = self.status_url(id);
        debug!(url = %url, "fetching task status");

        let response = self
            .inner
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::PollHttp {
                status: status.as_u16(),
                body,
            });
        }

        let data = parse_json_body(&body)?;
        Ok(TaskSnapshot::from_body(id.clone(), data))
    }
}

fn parse_json_body(body: &str) -> Result<Value, ClientError> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(body)
        .map_err(|e| ClientError::Protocol(format!("malformed JSON response: {}", e)))
}

// Backends have been seen returning ids both as strings and as numbers.
fn id_field_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTaskStore;
    use mockito::Server;
    use ncbench_core::TaskStatus;
    use serde_json::json;

    #[tokio::test]
    async fn test_submit_custom_repo_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/tasks/run-custom-repo/")
            .match_body(mockito::Matcher::Json(json!({
                "github_url": "https://github.com/u/r.git",
                "doc_change": "add pagination",
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "task-7"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let store = MemoryTaskStore::new();
        let request = TaskRequest::custom_repo("https://github.com/u/r.git", "add pagination");

        let id = client.submit(&request, &store).await.unwrap();
        assert_eq!(id, TaskId::new("task-7"));
        assert_eq!(store.last_task_id(), Some(TaskId::new("task-7")));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_submit_bench_records_bench_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/tasks/start-task/")
            .match_body(mockito::Matcher::Json(
                json!({ "nocode_bench_id": "astropy__astropy-1" }),
            ))
            .with_status(200)
            .with_body(r#"{"id": 42}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let store = MemoryTaskStore::new();
        let request = TaskRequest::bench("astropy__astropy-1");

        let id = client.submit(&request, &store).await.unwrap();
        // Numeric ids are stringified.
        assert_eq!(id, TaskId::new("42"));
        assert_eq!(store.last_task_id(), Some(TaskId::new("42")));
        assert_eq!(
            store.last_bench_id().map(|b| b.into_inner()),
            Some("astropy__astropy-1".to_owned())
        );
    }

    #[tokio::test]
    async fn test_submit_non_2xx_keeps_body_and_skips_store() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/tasks/run-custom-repo/")
            .with_status(500)
            .with_body("worker pool exhausted")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let store = MemoryTaskStore::new();
        let request = TaskRequest::custom_repo("https://github.com/u/r", "x");

        let err = client.submit(&request, &store).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"), "message was: {}", msg);
        assert!(msg.contains("worker pool exhausted"));
        assert_eq!(store.last_task_id(), None);
    }

    #[tokio::test]
    async fn test_submit_missing_id_is_protocol_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/tasks/start-task/")
            .with_status(200)
            .with_body(r#"{"accepted": true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let store = MemoryTaskStore::new();

        let err = client
            .submit(&TaskRequest::bench("b-1"), &store)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing task id"));
        assert_eq!(store.last_task_id(), None);
    }

    #[tokio::test]
    async fn test_submit_validation_never_hits_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/tasks/run-custom-repo/")
            .expect(0)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let store = MemoryTaskStore::new();
        let request = TaskRequest::custom_repo("not-a-url", "x");

        let err = client.submit(&request, &store).await.unwrap_err();
        assert!(err.is_validation());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_status_parses_snapshot() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tasks/t-1/")
            .with_status(200)
            .with_body(r#"{"status": "RUNNING", "result": null}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let snapshot = client.fetch_status(&TaskId::new("t-1")).await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Running);
        assert_eq!(snapshot.result, None);
    }

    #[tokio::test]
    async fn test_fetch_status_empty_body_is_empty_object() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tasks/t-1/")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let snapshot = client.fetch_status(&TaskId::new("t-1")).await.unwrap();
        assert_eq!(snapshot.status, TaskStatus::Unknown);
        assert_eq!(snapshot.result, None);
    }

    #[tokio::test]
    async fn test_fetch_status_non_2xx() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tasks/gone/")
            .with_status(404)
            .with_body("no such task")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url());
        let err = client.fetch_status(&TaskId::new("gone")).await.unwrap_err();
        assert_eq!(err.http_status(), Some(404));
        assert!(err.to_string().contains("no such task"));
    }
}
