use anyhow::Result;
use clap::Args;
use sqlx::PgPool;

pub mod summary;
pub mod dataset;
pub mod job;
pub mod endpoint;
pub mod types;
pub mod db;

#[derive(Args, Debug)]
pub struct StatsCmd {
    #[arg(long)] pub dataset: Option<i32>,
    #[arg(long)] pub job: Option<String>,
    #[arg(long)] pub endpoint: Option<String>,

    /// Number of shards to list in --dataset view (default: 10)
    #[arg(long, default_value_t = 10)]
    pub shard_limit: i64,
}

pub async fn run(pool: &PgPool, args: StatsCmd) -> Result<()> {
    if let Some(name) = args.job.as_deref() { return job::snapshot_job(pool, name).await; }
    if let Some(name) = args.endpoint.as_deref() { return endpoint::snapshot_endpoint(pool, name).await; }
    if let Some(id) = args.dataset { return dataset::dataset_stats(pool, id, args.shard_limit).await; }
    summary::summary(pool).await
}
