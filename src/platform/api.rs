use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::types::{
    EndpointSpec, EndpointStatus, InvocationRequest, InvocationResponse, TrainingJobSpec,
    TrainingJobStatus,
};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct PlatformConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("TUNE_API_KEY").ok(),
            base_url: std::env::var("TUNE_API_BASE").ok(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PlatformConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(timeout) = std::env::var("TUNE_API_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        cfg
    }
}

#[derive(Clone)]
pub struct PlatformClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl PlatformClient {
    pub fn new(cfg: PlatformConfig) -> Result<Self, PlatformError> {
        let base_url = cfg.base_url.clone().ok_or(PlatformError::MissingBaseUrl)?;
        url::Url::parse(&base_url).map_err(|_| PlatformError::InvalidUrl(base_url.clone()))?;
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(PlatformError::http)?;
        Ok(Self { http, base_url, api_key: cfg.api_key })
    }

    pub fn from_env() -> Result<Self, PlatformError> {
        Self::new(PlatformConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    fn auth(&self, rb: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => rb.bearer_auth(key),
            None => rb,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, rb: reqwest::RequestBuilder) -> Result<T, PlatformError> {
        let response = self.auth(rb).send().await.map_err(PlatformError::from_reqwest)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(PlatformError::from_reqwest)?;

        if !status.is_success() {
            let api_err = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .ok()
                .map(|env| env.error);
            return Err(PlatformError::Api {
                status,
                error: api_err.unwrap_or_default(),
            });
        }

        serde_json::from_slice(&bytes).map_err(PlatformError::Decode)
    }

    async fn send_empty(&self, rb: reqwest::RequestBuilder) -> Result<(), PlatformError> {
        let response = self.auth(rb).send().await.map_err(PlatformError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await.map_err(PlatformError::from_reqwest)?;
            let api_err = serde_json::from_slice::<ApiErrorEnvelope>(&bytes)
                .ok()
                .map(|env| env.error);
            return Err(PlatformError::Api {
                status,
                error: api_err.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// The managed control plane seam: everything the pipeline asks of the
/// platform goes through here, so tests can swap in MockBackend.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn create_training_job(&self, spec: TrainingJobSpec) -> Result<TrainingJobStatus, PlatformError>;
    async fn describe_training_job(&self, name: &str) -> Result<TrainingJobStatus, PlatformError>;
    async fn stop_training_job(&self, name: &str) -> Result<(), PlatformError>;
    async fn create_endpoint(&self, spec: EndpointSpec) -> Result<EndpointStatus, PlatformError>;
    async fn describe_endpoint(&self, name: &str) -> Result<EndpointStatus, PlatformError>;
    async fn delete_endpoint(&self, name: &str) -> Result<(), PlatformError>;
    async fn invoke_endpoint(&self, name: &str, request: InvocationRequest) -> Result<InvocationResponse, PlatformError>;
}

#[async_trait]
impl Backend for PlatformClient {
    async fn create_training_job(&self, spec: TrainingJobSpec) -> Result<TrainingJobStatus, PlatformError> {
        let rb = self.http.post(self.endpoint("training-jobs")).json(&spec);
        self.send_json(rb).await
    }

    async fn describe_training_job(&self, name: &str) -> Result<TrainingJobStatus, PlatformError> {
        let rb = self.http.get(self.endpoint(&format!("training-jobs/{}", name)));
        self.send_json(rb).await
    }

    async fn stop_training_job(&self, name: &str) -> Result<(), PlatformError> {
        let rb = self.http.post(self.endpoint(&format!("training-jobs/{}/stop", name)));
        self.send_empty(rb).await
    }

    async fn create_endpoint(&self, spec: EndpointSpec) -> Result<EndpointStatus, PlatformError> {
        let rb = self.http.post(self.endpoint("endpoints")).json(&spec);
        self.send_json(rb).await
    }

    async fn describe_endpoint(&self, name: &str) -> Result<EndpointStatus, PlatformError> {
        let rb = self.http.get(self.endpoint(&format!("endpoints/{}", name)));
        self.send_json(rb).await
    }

    async fn delete_endpoint(&self, name: &str) -> Result<(), PlatformError> {
        let rb = self.http.delete(self.endpoint(&format!("endpoints/{}", name)));
        self.send_empty(rb).await
    }

    async fn invoke_endpoint(&self, name: &str, request: InvocationRequest) -> Result<InvocationResponse, PlatformError> {
        let rb = self
            .http
            .post(self.endpoint(&format!("endpoints/{}/invocations", name)))
            .json(&request);
        self.send_json(rb).await
    }
}

#[derive(Debug)]
pub enum PlatformError {
    MissingBaseUrl,
    MissingStoreUrl,
    InvalidUrl(String),
    Http(reqwest::Error),
    Timeout,
    Api {
        status: StatusCode,
        error: ApiErrorBody,
    },
    MockQueueEmpty,
    Decode(serde_json::Error),
}

impl PlatformError {
    fn http(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PlatformError::Timeout
        } else {
            PlatformError::Http(err)
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        Self::http(err)
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            PlatformError::Timeout => true,
            PlatformError::Http(_) => true,
            PlatformError::Api { status, .. } => status.is_server_error(),
            PlatformError::MissingBaseUrl
            | PlatformError::MissingStoreUrl
            | PlatformError::InvalidUrl(_)
            | PlatformError::MockQueueEmpty
            | PlatformError::Decode(_) => false,
        }
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::MissingBaseUrl => write!(f, "TUNE_API_BASE is not set"),
            PlatformError::MissingStoreUrl => write!(f, "TUNE_ARTIFACT_STORE is not set"),
            PlatformError::InvalidUrl(url) => write!(f, "invalid base url: {url}"),
            PlatformError::Http(err) => write!(f, "http error: {err}"),
            PlatformError::Timeout => write!(f, "request timed out"),
            PlatformError::Api { status, error } => {
                write!(f, "api error {status}: {}", error.message)
            }
            PlatformError::MockQueueEmpty => {
                write!(f, "mock backend response queue is empty")
            }
            PlatformError::Decode(err) => write!(f, "decode error: {err}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlatformError::Http(err) => Some(err),
            PlatformError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl Default for ApiErrorBody {
    fn default() -> Self {
        Self {
            message: "unknown error".to_string(),
            code: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

/// Test double with per-resource response queues and recorded calls.
#[derive(Debug, Default)]
pub struct MockBackend {
    jobs: Mutex<VecDeque<Result<TrainingJobStatus, PlatformError>>>,
    endpoints: Mutex<VecDeque<Result<EndpointStatus, PlatformError>>>,
    invocations: Mutex<VecDeque<Result<InvocationResponse, PlatformError>>>,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_job(&self, resp: Result<TrainingJobStatus, PlatformError>) {
        self.jobs.lock().unwrap().push_back(resp);
    }

    pub fn push_endpoint(&self, resp: Result<EndpointStatus, PlatformError>) {
        self.endpoints.lock().unwrap().push_back(resp);
    }

    pub fn push_invocation(&self, resp: Result<InvocationResponse, PlatformError>) {
        self.invocations.lock().unwrap().push_back(resp);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn create_training_job(&self, spec: TrainingJobSpec) -> Result<TrainingJobStatus, PlatformError> {
        self.record(format!("create_training_job:{}", spec.name));
        self.jobs.lock().unwrap().pop_front().unwrap_or(Err(PlatformError::MockQueueEmpty))
    }

    async fn describe_training_job(&self, name: &str) -> Result<TrainingJobStatus, PlatformError> {
        self.record(format!("describe_training_job:{}", name));
        self.jobs.lock().unwrap().pop_front().unwrap_or(Err(PlatformError::MockQueueEmpty))
    }

    async fn stop_training_job(&self, name: &str) -> Result<(), PlatformError> {
        self.record(format!("stop_training_job:{}", name));
        Ok(())
    }

    async fn create_endpoint(&self, spec: EndpointSpec) -> Result<EndpointStatus, PlatformError> {
        self.record(format!("create_endpoint:{}", spec.name));
        self.endpoints.lock().unwrap().pop_front().unwrap_or(Err(PlatformError::MockQueueEmpty))
    }

    async fn describe_endpoint(&self, name: &str) -> Result<EndpointStatus, PlatformError> {
        self.record(format!("describe_endpoint:{}", name));
        self.endpoints.lock().unwrap().pop_front().unwrap_or(Err(PlatformError::MockQueueEmpty))
    }

    async fn delete_endpoint(&self, name: &str) -> Result<(), PlatformError> {
        self.record(format!("delete_endpoint:{}", name));
        Ok(())
    }

    async fn invoke_endpoint(&self, name: &str, _request: InvocationRequest) -> Result<InvocationResponse, PlatformError> {
        self.record(format!("invoke_endpoint:{}", name));
        self.invocations.lock().unwrap().pop_front().unwrap_or(Err(PlatformError::MockQueueEmpty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::types::{GenerationParameters, Hyperparameters, JobState};

    fn sample_spec() -> TrainingJobSpec {
        TrainingJobSpec {
            name: "bloomz-7b1-lora-abc123".into(),
            base_model: "bigscience/bloomz-7b1".into(),
            input_uri: "store://artifacts/datasets/samsum/train/".into(),
            instance_type: "ml.g5.2xlarge".into(),
            instance_count: 1,
            hyperparameters: Hyperparameters {
                epochs: 3,
                learning_rate: 2e-4,
                per_device_train_batch_size: 4,
                lora_r: 16,
                lora_alpha: 32,
                lora_dropout: 0.05,
                load_in_8bit: true,
            },
        }
    }

    #[test]
    fn job_spec_serializes_hyperparameters() {
        let value = serde_json::to_value(sample_spec()).unwrap();
        assert_eq!(value["base_model"], "bigscience/bloomz-7b1");
        assert_eq!(value["hyperparameters"]["lora_r"], 16);
        assert_eq!(value["hyperparameters"]["load_in_8bit"], true);
        assert_eq!(value["instance_count"], 1);
    }

    #[test]
    fn job_state_round_trips_pascal_case() {
        let parsed: TrainingJobStatus = serde_json::from_str(
            r#"{"name":"j","state":"InProgress"}"#,
        )
        .unwrap();
        assert_eq!(parsed.state, JobState::InProgress);
        assert!(!parsed.state.is_terminal());
        assert_eq!(parsed.state.as_db_str(), "in_progress");
    }

    #[tokio::test]
    async fn mock_backend_replays_job_states_in_order() {
        let mock = MockBackend::new();
        for state in [JobState::Submitted, JobState::InProgress, JobState::Completed] {
            mock.push_job(Ok(TrainingJobStatus {
                name: "j".into(),
                state,
                failure_reason: None,
                artifact_uri: (state == JobState::Completed)
                    .then(|| "store://artifacts/models/j/adapter.tar.gz".to_string()),
            }));
        }

        let first = mock.create_training_job(sample_spec()).await.unwrap();
        assert_eq!(first.state, JobState::Submitted);
        let second = mock.describe_training_job("j").await.unwrap();
        assert_eq!(second.state, JobState::InProgress);
        let last = mock.describe_training_job("j").await.unwrap();
        assert!(last.state.is_terminal());
        assert!(last.artifact_uri.is_some());
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn mock_backend_empty_queue_errors() {
        let mock = MockBackend::new();
        let err = mock.describe_endpoint("missing").await.unwrap_err();
        assert!(matches!(err, PlatformError::MockQueueEmpty));
        assert!(!err.is_retryable());
    }

    #[test]
    fn api_error_display_includes_status() {
        let err = PlatformError::Api {
            status: StatusCode::BAD_REQUEST,
            error: ApiErrorBody {
                message: "bad request".into(),
                code: Some("validation".into()),
            },
        };
        assert_eq!(format!("{err}"), "api error 400 Bad Request: bad request");
        assert!(!err.is_retryable());

        let server = PlatformError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error: ApiErrorBody::default(),
        };
        assert!(server.is_retryable());
    }

    #[test]
    fn invocation_request_serializes_parameters() {
        let req = InvocationRequest {
            inputs: "Summarize the chat dialogue:\n...\n---\nSummary:\n".into(),
            parameters: GenerationParameters {
                max_new_tokens: 256,
                temperature: 0.9,
                top_p: 0.9,
                do_sample: true,
                stop: Some(vec!["</s>".into()]),
            },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["parameters"]["max_new_tokens"], 256);
        assert_eq!(value["parameters"]["stop"][0], "</s>");
    }
}
