use serde::Serialize;

// Plan envelope types
#[derive(Serialize)]
pub struct DatasetSample { pub dataset_id: i32, pub hub_id: String, pub split: String }

#[derive(Serialize)]
pub struct IngestPlan { pub datasets: usize, pub mode: String, pub limit: usize, pub sample_datasets: Vec<DatasetSample> }

// Apply/result envelope types
#[derive(Serialize)]
pub struct DatasetSummary { pub dataset_id: i32, pub inserted: usize, pub updated: usize, pub skipped: usize, pub errors: usize }

#[derive(Serialize)]
pub struct IngestTotals { pub inserted: usize, pub updated: usize, pub skipped: usize, pub errors: usize }

#[derive(Serialize)]
pub struct IngestApply { pub totals: IngestTotals, pub per_dataset: Vec<DatasetSummary> }
