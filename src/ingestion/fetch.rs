use anyhow::{anyhow, Result};
use reqwest::Client;

pub const DATASETS_SERVER_BASE: &str = "https://datasets-server.huggingface.co";

/// Fetch one page of dataset rows from the datasets-server REST API.
pub async fn fetch_rows(
    client: &Client,
    base: &str,
    hub_id: &str,
    config: Option<&str>,
    split: &str,
    offset: usize,
    length: usize,
) -> Result<serde_json::Value> {
    let url = format!("{}/rows", base.trim_end_matches('/'));
    let config = config.unwrap_or("default");
    let resp = client
        .get(&url)
        .query(&[
            ("dataset", hub_id),
            ("config", config),
            ("split", split),
            ("offset", &offset.to_string()),
            ("length", &length.to_string()),
        ])
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(anyhow!("datasets-server {}: {}", status, body));
    }
    let payload = resp.json::<serde_json::Value>().await?;
    Ok(payload)
}
