use std::time::Duration;

use bytes::Bytes;
use reqwest::Client as HttpClient;

use super::api::PlatformError;

const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("TUNE_ARTIFACT_STORE").ok(),
            token: std::env::var("TUNE_ARTIFACT_TOKEN").ok(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(timeout) = std::env::var("TUNE_ARTIFACT_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        cfg
    }
}

/// Object-store client: bearer-auth PUT keyed under the configured base URL.
/// Uploads are large, so the timeout is generous.
#[derive(Clone)]
pub struct ArtifactStore {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl ArtifactStore {
    pub fn new(cfg: StoreConfig) -> Result<Self, PlatformError> {
        let base_url = cfg.base_url.clone().ok_or(PlatformError::MissingStoreUrl)?;
        url::Url::parse(&base_url).map_err(|_| PlatformError::InvalidUrl(base_url.clone()))?;
        let http = HttpClient::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(PlatformError::from_reqwest)?;
        Ok(Self { http, base_url, token: cfg.token })
    }

    pub fn from_env() -> Result<Self, PlatformError> {
        Self::new(StoreConfig::from_env())
    }

    /// The URI an object will live at once uploaded.
    pub fn uri_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key.trim_start_matches('/'))
    }

    pub async fn put_object(&self, key: &str, body: Bytes) -> Result<String, PlatformError> {
        let uri = self.uri_for(key);
        let mut rb = self.http.put(&uri).body(body);
        if let Some(token) = &self.token {
            rb = rb.bearer_auth(token);
        }
        let response = rb.send().await.map_err(PlatformError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::Api {
                status,
                error: Default::default(),
            });
        }
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_join_handles_slashes() {
        let store = ArtifactStore {
            http: HttpClient::new(),
            base_url: "https://store.example/artifacts/".into(),
            token: None,
        };
        assert_eq!(
            store.uri_for("/datasets/samsum/train/shard-00000.jsonl"),
            "https://store.example/artifacts/datasets/samsum/train/shard-00000.jsonl"
        );
    }
}
