pub mod counts;
pub mod deletes;
pub mod remote;
pub mod status;
pub mod vacuum;

use anyhow::{Context, Result};
use clap::Args;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::platform::PlatformClient;
use crate::telemetry::{self};
use crate::telemetry::ops::gc::Phase as GcPhase;
use crate::util::time::parse_cutoff_str;

#[derive(clap::ValueEnum, Clone, Debug)]
pub enum VacuumMode {
    #[value(name = "analyze")] Analyze,
    #[value(name = "full")] Full,
    #[value(name = "off")] Off,
}

#[derive(Args, Debug)]
pub struct GcCmd {
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value = "30d")] pub older_than: String,
    #[arg(long, default_value_t = 10_000)] pub max: i64,
    #[arg(long)] pub dataset: Option<i32>,
    /// Tear down every live endpoint, not just those older than the cutoff
    #[arg(long, default_value_t = false)] pub delete_endpoints: bool,
    #[arg(long, value_enum, default_value_t = VacuumMode::Analyze)] pub vacuum: VacuumMode,
    #[arg(long, default_value_t = false)] pub fix_status: bool,
}

pub async fn run(pool: &PgPool, args: GcCmd) -> Result<()> {
    let cutoff = parse_cutoff_str(&args.older_than);
    let execute = args.apply;
    let mode = if execute { "apply" } else { "plan" };

    let log = telemetry::gc();
    let _g = log.root_span_kv([
        ("mode", mode.to_string()),
        ("dataset", format!("{:?}", args.dataset)),
        ("cutoff", format!("{:?}", cutoff)),
        ("max", args.max.to_string()),
        ("delete_endpoints", args.delete_endpoints.to_string()),
        ("vacuum", format!("{:?}", args.vacuum)),
        ("fix_status", args.fix_status.to_string()),
    ]).entered();
    let _p = log.span(&GcPhase::Plan).entered();
    log.info(format!(
        "📝 GC plan — mode={} dataset={:?} cutoff={:?} max={} delete_endpoints={} vacuum={:?} fix_status={}",
        mode, args.dataset, cutoff, args.max, args.delete_endpoints, args.vacuum, args.fix_status
    ));
    if !execute { log.info("   Use --apply to execute."); }

    // live endpoints (all with --delete-endpoints, else past the cutoff)
    let live_endpoints = { let _s = log.span(&GcPhase::Count).entered(); counts::count_live_endpoints(pool, cutoff, args.delete_endpoints).await? };
    log.info(format!("🛰️  Live endpoints to tear down: {}", live_endpoints));

    // jobs stuck in flight past the cutoff
    let stale_jobs = { let _s = log.span(&GcPhase::Count).entered(); counts::count_stale_jobs(pool, cutoff).await? };
    log.info(format!("🚀 Stale jobs (> cutoff): {}", stale_jobs));

    // error examples past the cutoff
    let error_examples = { let _s = log.span(&GcPhase::Count).entered(); counts::count_error_examples(pool, cutoff, args.dataset).await? };
    log.info(format!("⚠️  Error examples (> cutoff): {}", error_examples));

    // never-packed examples past the cutoff
    let never_packed = { let _s = log.span(&GcPhase::Count).entered(); counts::count_never_packed(pool, cutoff, args.dataset).await? };
    log.info(format!("⏳ Never-packed examples (> cutoff): {}", never_packed));

    // shards with no usable content
    let bad_shards = { let _s = log.span(&GcPhase::Count).entered(); counts::count_bad_shards(pool, args.dataset).await? };
    log.info(format!("🧹 Bad shards (0 blocks/tokens): {}", bad_shards));

    if execute && (live_endpoints > 0 || stale_jobs > 0) {
        let client = PlatformClient::from_env().context("init platform client")?;

        if live_endpoints > 0 {
            let _s = log.span(&GcPhase::DeleteEndpoint).entered();
            let names = counts::list_live_endpoints(pool, cutoff, args.delete_endpoints, args.max).await?;
            let deleted = remote::delete_endpoints(&client, &names).await?;
            deletes::mark_endpoints_deleted(pool, &deleted).await?;
        }

        if stale_jobs > 0 {
            let _s = log.span(&GcPhase::StopJob).entered();
            let names = counts::list_stale_jobs(pool, cutoff, args.max).await?;
            let stopped = remote::stop_jobs(&client, &names).await?;
            deletes::mark_jobs_stopped(pool, &stopped).await?;
        }
    }

    if execute && error_examples > 0 { let _s = log.span(&GcPhase::Delete).entered(); deletes::delete_error_examples(pool, cutoff, args.dataset, args.max).await?; }
    if execute && never_packed > 0 { let _s = log.span(&GcPhase::Delete).entered(); deletes::delete_never_packed(pool, cutoff, args.dataset, args.max).await?; }
    if execute && bad_shards > 0 { let _s = log.span(&GcPhase::Delete).entered(); deletes::delete_bad_shards(pool, args.dataset, args.max).await?; }

    // fix status
    if args.fix_status {
        if execute { let _s = log.span(&GcPhase::FixStatus).entered(); status::fix_statuses(pool, args.dataset).await?; }
        else { log.info("🔎 Would normalize example/shard status from shard and upload presence"); }
    }

    // vacuum/analyze
    match args.vacuum {
        VacuumMode::Off => {}
        VacuumMode::Analyze => {
            if execute { let _s = log.span(&GcPhase::Analyze).entered(); vacuum::analyze_tables(pool).await?; }
            else { log.info("🔎 Would ANALYZE tune.dataset, tune.example, tune.shard, tune.job, tune.endpoint"); }
        }
        VacuumMode::Full => {
            if execute { let _s = log.span(&GcPhase::Vacuum).entered(); vacuum::vacuum_full(pool).await?; }
            else { log.info("🔎 Would VACUUM (ANALYZE, FULL) the tune schema tables"); }
        }
    }

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct Counts { live_endpoints: i64, stale_jobs: i64, error_examples: i64, never_packed: i64, bad_shards: i64 }
        let counts_out = Counts { live_endpoints, stale_jobs, error_examples, never_packed, bad_shards };
        if !execute {
            #[derive(Serialize)]
            struct GcPlanOut {
                mode: String,
                dataset: Option<i32>,
                cutoff: Option<DateTime<Utc>>,
                max: i64,
                delete_endpoints: bool,
                vacuum: String,
                fix_status: bool,
                counts: Counts,
            }
            let plan = GcPlanOut {
                mode: mode.to_string(),
                dataset: args.dataset,
                cutoff,
                max: args.max,
                delete_endpoints: args.delete_endpoints,
                vacuum: format!("{:?}", args.vacuum),
                fix_status: args.fix_status,
                counts: counts_out,
            };
            let log = telemetry::gc();
            log.plan(&plan)?;
        } else {
            #[derive(Serialize)]
            struct GcResultOut { counts_before: Counts, delete_endpoints: bool, fix_status: bool, vacuum: String }
            let res = GcResultOut {
                counts_before: counts_out,
                delete_endpoints: args.delete_endpoints,
                fix_status: args.fix_status,
                vacuum: format!("{:?}", args.vacuum),
            };
            let log = telemetry::gc();
            log.result(&res)?;
        }
    }

    Ok(())
}
