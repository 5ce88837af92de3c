use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use crate::client::{GenerationService, StatusOutcome};
use crate::config::ServiceSettings;
use crate::error::ServiceError;
use crate::runtime::task::{ArtifactRef, TaskId};

pub const DEFAULT_BASE_URL: &str = "https://yabes-api.pages.dev/api/ai/video/v2";

#[derive(Debug, Deserialize)]
struct CreateResponse {
    #[serde(rename = "taskId")]
    task_id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    output: Option<Value>,
}

/// Query-parameter style client: `GET {base}?action=create&prompt=..` and
/// `GET {base}?action=status&taskId=..`.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGenerationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_settings(&ServiceSettings {
            base_url: base_url.into(),
            ..ServiceSettings::default()
        })
    }

    pub fn with_settings(settings: &ServiceSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.clone(),
            timeout: settings.request_timeout(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, query: &[(&str, &str)]) -> Result<T, String> {
        let response = self.client
            .get(&self.base_url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected HTTP status {}", status));
        }

        response.json::<T>().await.map_err(|e| format!("invalid response body: {}", e))
    }
}

/// Non-empty strings and numbers count as identifiers; everything else is absent.
fn non_empty_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn create(&self, prompt: &str) -> Result<TaskId, ServiceError> {
        if prompt.trim().is_empty() {
            return Err(ServiceError::Submission("empty prompt".to_string()));
        }

        let body: CreateResponse = self
            .get_json(&[("action", "create"), ("prompt", prompt)])
            .await
            .map_err(ServiceError::Submission)?;

        let task_id = non_empty_text(body.task_id)
            .ok_or_else(|| ServiceError::Submission("response has no taskId".to_string()))?;
        debug!(task_id = %task_id, "Generation task created");
        Ok(TaskId::new(task_id))
    }

    async fn check_status(&self, task_id: &TaskId) -> Result<StatusOutcome, ServiceError> {
        let body: StatusResponse = self
            .get_json(&[("action", "status"), ("taskId", task_id.as_str())])
            .await
            .map_err(ServiceError::StatusCheck)?;

        match body.output {
            None | Some(Value::Null) => Ok(StatusOutcome::Pending),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(StatusOutcome::Pending),
            Some(Value::String(s)) => Ok(StatusOutcome::Ready(ArtifactRef::new(s))),
            Some(other) => Err(ServiceError::StatusCheck(format!("unexpected output value: {}", other))),
        }
    }
}
