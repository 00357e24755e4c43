use anyhow::Result;
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::stats::Phase as StatsPhase;
use crate::stats::types::*;
use crate::stats::db;

pub async fn summary(pool: &PgPool) -> Result<()> {
    let log = telemetry::stats();
    let _s = log.span(&StatsPhase::Summary).entered();

    // datasets listing
    log.info("📚 Datasets:");
    let datasets = db::fetch_datasets(pool).await?;
    for d in &datasets {
        log.info(format!(
            "  #{}  active={}  {}:{}  added_at={:?}",
            d.dataset_id,
            d.is_active.unwrap_or(true),
            d.hub_id,
            d.split,
            d.added_at
        ));
    }

    // examples by status
    log.info("📄 Examples by status:");
    let examples = db::examples_by_status(pool, None).await?;
    for r in &examples {
        log.info(format!("  {:10} {}", r.status, r.cnt));
    }
    if let Ok(last) = db::last_fetched(pool).await { log.info(format!("  Last fetched: {:?}", last)); }

    // shards summary
    let shards = db::shards_summary(pool, None).await?;
    log.info(format!("📦 Shards: total={} blocks={} tokens={}", shards.total, shards.blocks, shards.tokens));

    // upload coverage
    let cov = db::upload_coverage(pool, None).await?;
    log.info(format!("📈 Uploaded: {}/{} ({:.1}%)", cov.uploaded, cov.shards, cov.pct));
    log.info(format!("   Missing uploads: {}", cov.missing));

    // jobs
    log.info("🚀 Jobs by status:");
    let jobs = db::jobs_by_status(pool).await?;
    for r in &jobs {
        log.info(format!("  {:12} {}", r.status, r.cnt));
    }
    let last_job = db::last_job(pool).await?;
    match &last_job {
        Some(j) => log.info(format!(
            "   Last job: {} ({}, {}) artifact={:?}",
            j.name, j.status, j.base_model, j.artifact_uri
        )),
        None => log.info("   Last job: (none)"),
    }

    // endpoints
    log.info("🛰️  Endpoints by status:");
    let endpoints = db::endpoints_by_status(pool).await?;
    for r in &endpoints {
        log.info(format!("  {:12} {}", r.status, r.cnt));
    }
    let live = db::live_endpoints(pool).await?;
    for e in &live {
        log.info(format!("   live: {} ({}) job={:?}", e.name, e.status, e.job_name));
    }

    // JSON envelope
    if telemetry::config::json_mode() {
        let result = StatsSummary {
            datasets,
            examples_by_status: examples,
            last_fetched: db::last_fetched(pool).await?,
            shards,
            coverage: cov,
            jobs_by_status: jobs,
            last_job,
            endpoints_by_status: endpoints,
            live_endpoints: live,
        };
        log.result(&result)?;
    }

    Ok(())
}
