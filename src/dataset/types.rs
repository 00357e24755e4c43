use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct DatasetAddPlan {
    pub action: &'static str,
    pub hub_id: String,
    pub config: Option<String>,
    pub split: String,
    pub fields: Vec<String>,
    pub active: bool,
}

#[derive(Serialize)]
pub struct DatasetAddResult {
    pub inserted: bool,
    pub hub_id: String,
    pub split: String,
}

#[derive(Serialize)]
pub struct DatasetRow {
    pub dataset_id: i32,
    pub hub_id: String,
    pub config: Option<String>,
    pub split: String,
    pub template: String,
    pub is_active: Option<bool>,
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct DatasetList {
    pub datasets: Vec<DatasetRow>,
}
