use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use sqlx::PgPool;

use crate::platform::ArtifactStore;
use crate::telemetry::{self};
use crate::telemetry::ops::upload::Phase as UploadPhase;

mod db;
mod r#loop;

#[derive(Args, Debug)]
pub struct UploadCmd {
    #[arg(long)] dataset: Option<i32>,
    /// Shards per DB page
    #[arg(long, default_value_t = 8)] batch: usize,
    #[arg(long)] max: Option<i64>,
    #[arg(long, default_value_t = false)] force: bool,
    #[arg(long, default_value_t = false)] apply: bool,
    #[arg(long, default_value_t = 10)] plan_limit: usize,
}

pub async fn run(pool: &PgPool, args: UploadCmd) -> Result<()> {
    let log = telemetry::upload();
    let _g = log
        .root_span_kv([
            ("dataset", format!("{:?}", args.dataset)),
            ("batch", args.batch.to_string()),
            ("max", format!("{:?}", args.max)),
            ("force", args.force.to_string()),
            ("apply", args.apply.to_string()),
        ])
        .entered();

    let batch = args.batch.max(1);

    // Plan-only
    if !args.apply {
        let _sp = log.span(&UploadPhase::Plan).entered();
        let total_candidates = db::count_candidates(pool, args.dataset, args.force).await?;
        let planned = match args.max { Some(m) => total_candidates.min(m), None => total_candidates };
        let ids = db::list_candidate_ids(pool, args.dataset, args.force, args.plan_limit as i64).await?;
        if telemetry::config::json_mode() {
            #[derive(Serialize)]
            struct UploadPlan { force: bool, batch: usize, candidates: i64, planned: i64, sample_shard_ids: Vec<i64> }
            let plan = UploadPlan { force: args.force, batch, candidates: total_candidates, planned, sample_shard_ids: ids };
            log.plan(&plan)?;
        } else {
            log.info(format!(
                "📝 Upload plan — batch={} force={} candidates={} planned={}",
                batch, args.force, total_candidates, planned
            ));
            for id in &ids { log.info(format!("  shard_id={}", id)); }
            if (args.plan_limit as i64) < planned { log.info("  ... (more up to planned count)"); }
            log.info("   Use --apply to run upload.");
        }
        return Ok(());
    }

    // APPLY: artifact store from env
    let store = ArtifactStore::from_env().context("init artifact store")?;

    let total = if args.force {
        r#loop::upload_force_once(pool, &store, args.dataset, args.max).await?
    } else {
        r#loop::upload_missing_paged(pool, &store, args.dataset, batch, args.max).await?
    };

    if total == 0 {
        log.info(format!("ℹ️  No shards to upload (force={})", args.force));
    }

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct UploadResult { total_uploaded: i64 }
        log.result(&UploadResult { total_uploaded: total })?;
    }

    Ok(())
}
