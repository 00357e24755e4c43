use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct StatsDatasetRow {
    pub dataset_id: i32,
    pub hub_id: String,
    pub split: String,
    pub is_active: Option<bool>,
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct StatusCount {
    pub status: String,
    pub cnt: i64,
}

#[derive(Serialize)]
pub struct ShardsSummary {
    pub total: i64,
    pub blocks: i64,
    pub tokens: i64,
}

#[derive(Serialize)]
pub struct UploadCoverage {
    pub uploaded: i64,
    pub shards: i64,
    pub pct: f64,
    pub missing: i64,
}

#[derive(Serialize)]
pub struct StatsJobRow {
    pub name: String,
    pub base_model: String,
    pub status: String,
    pub instance_type: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub artifact_uri: Option<String>,
}

#[derive(Serialize)]
pub struct StatsEndpointRow {
    pub name: String,
    pub job_name: Option<String>,
    pub status: String,
    pub instance_type: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct StatsSummary {
    pub datasets: Vec<StatsDatasetRow>,
    pub examples_by_status: Vec<StatusCount>,
    pub last_fetched: Option<DateTime<Utc>>,
    pub shards: ShardsSummary,
    pub coverage: UploadCoverage,
    pub jobs_by_status: Vec<StatusCount>,
    pub last_job: Option<StatsJobRow>,
    pub endpoints_by_status: Vec<StatusCount>,
    pub live_endpoints: Vec<StatsEndpointRow>,
}
