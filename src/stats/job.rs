use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::stats::Phase as StatsPhase;
use crate::stats::db;

pub async fn snapshot_job(pool: &PgPool, name: &str) -> Result<()> {
    let log = telemetry::stats();
    let _s = log.span(&StatsPhase::Job).entered();

    let Some((job, hyperparameters)) = db::job_by_name(pool, name).await? else {
        log.warn(format!("⚠️  Job '{}' not found", name));
        return Ok(());
    };

    log.info(format!("🚀 Job {}", job.name));
    log.info(format!("   base_model={} instance={}", job.base_model, job.instance_type));
    log.info(format!("   status={} submitted_at={:?} finished_at={:?}", job.status, job.submitted_at, job.finished_at));
    log.info(format!("   artifact={:?}", job.artifact_uri));
    log.info(format!("   hyperparameters={}", hyperparameters));

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct JobSnapshot { job: crate::stats::types::StatsJobRow, hyperparameters: serde_json::Value }
        log.result(&JobSnapshot { job, hyperparameters })?;
    }
    Ok(())
}
