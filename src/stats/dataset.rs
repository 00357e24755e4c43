use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::stats::Phase as StatsPhase;
use crate::stats::db;

pub async fn dataset_stats(pool: &PgPool, dataset_id: i32, shard_limit: i64) -> Result<()> {
    let log = telemetry::stats();
    let _s = log.span(&StatsPhase::Dataset).entered();

    let examples = db::examples_by_status(pool, Some(dataset_id)).await?;
    log.info(format!("📄 Dataset {} examples by status:", dataset_id));
    for r in &examples {
        log.info(format!("  {:10} {}", r.status, r.cnt));
    }

    let shards = db::shards_summary(pool, Some(dataset_id)).await?;
    log.info(format!("📦 Shards: total={} blocks={} tokens={}", shards.total, shards.blocks, shards.tokens));

    let cov = db::upload_coverage(pool, Some(dataset_id)).await?;
    log.info(format!("📈 Uploaded: {}/{} ({:.1}%)", cov.uploaded, cov.shards, cov.pct));

    let listing = db::shard_list(pool, dataset_id, shard_limit).await?;
    for (idx, blocks, status, remote_uri) in &listing {
        log.info(format!("  shard-{:05} blocks={} status={} remote={:?}", idx, blocks, status, remote_uri));
    }

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct ShardLine { shard_index: i32, blocks: i32, status: String, remote_uri: Option<String> }
        #[derive(Serialize)]
        struct DatasetStats {
            dataset_id: i32,
            examples_by_status: Vec<crate::stats::types::StatusCount>,
            shards: crate::stats::types::ShardsSummary,
            coverage: crate::stats::types::UploadCoverage,
            shard_list: Vec<ShardLine>,
        }
        let result = DatasetStats {
            dataset_id,
            examples_by_status: examples,
            shards,
            coverage: cov,
            shard_list: listing
                .into_iter()
                .map(|(shard_index, blocks, status, remote_uri)| ShardLine { shard_index, blocks, status, remote_uri })
                .collect(),
        };
        log.result(&result)?;
    }
    Ok(())
}
