use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::stats::Phase as StatsPhase;
use crate::stats::db;

pub async fn snapshot_endpoint(pool: &PgPool, name: &str) -> Result<()> {
    let log = telemetry::stats();
    let _s = log.span(&StatsPhase::Endpoint).entered();

    let Some(ep) = db::endpoint_by_name(pool, name).await? else {
        log.warn(format!("⚠️  Endpoint '{}' not found", name));
        return Ok(());
    };

    log.info(format!("🛰️  Endpoint {}", ep.name));
    log.info(format!("   status={} instance={} job={:?}", ep.status, ep.instance_type, ep.job_name));
    log.info(format!("   created_at={:?}", ep.created_at));

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct EndpointSnapshot { endpoint: crate::stats::types::StatsEndpointRow }
        log.result(&EndpointSnapshot { endpoint: ep })?;
    }
    Ok(())
}
