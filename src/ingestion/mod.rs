use anyhow::Result;
use clap::Args;
use reqwest::Client;
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::ingest::Phase as IngestPhase;

mod fetch;
mod parse;
mod write;
mod types;
mod db;

#[derive(Args)]
pub struct IngestCmd {
    #[arg(long)] pub dataset: Option<i32>,
    #[arg(long)] pub hub_id: Option<String>,
    /// Max rows to ingest per dataset
    #[arg(long, default_value_t = 2000)] pub limit: usize,
    /// Rows per datasets-server page (API caps at 100)
    #[arg(long, default_value_t = 100)] pub page_size: usize,
    #[arg(long)] pub api_base: Option<String>,
    #[arg(long)] pub force_refetch: bool,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

pub async fn run(pool: &PgPool, args: IngestCmd) -> Result<()> {
    let log = telemetry::ingest();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("limit", (args.limit as i64).to_string()),
        ("page_size", (args.page_size as i64).to_string()),
        ("force_refetch", args.force_refetch.to_string()),
        ("dataset", format!("{:?}", args.dataset)),
        ("hub_id", format!("{:?}", args.hub_id)),
    ]).entered();

    // resolve dataset registrations to process
    let datasets = db::select_datasets(pool, args.dataset, args.hub_id.as_deref()).await?;

    if !args.apply {
        let mode = if args.force_refetch { "upsert" } else { "insert-only" };
        if telemetry::config::json_mode() {
            use types::{DatasetSample, IngestPlan};
            let samples: Vec<DatasetSample> = datasets.iter().take(args.plan_limit)
                .map(|d| DatasetSample { dataset_id: d.dataset_id, hub_id: d.hub_id.clone(), split: d.split.clone() })
                .collect();
            let plan = IngestPlan { datasets: datasets.len(), mode: mode.to_string(), limit: args.limit, sample_datasets: samples };
            log.plan(&plan)?;
        } else {
            log.info(format!("📝 Ingest plan — datasets={} mode={} limit={}", datasets.len(), mode, args.limit));
            for d in datasets.iter().take(args.plan_limit) { log.info(format!("  dataset_id={} hub_id={} split={}", d.dataset_id, d.hub_id, d.split)); }
            if datasets.len() > args.plan_limit { log.info(format!("  ... ({} more)", datasets.len() - args.plan_limit)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let client = Client::new();
    let api_base = args.api_base.clone().unwrap_or_else(|| fetch::DATASETS_SERVER_BASE.to_string());
    let page_size = args.page_size.clamp(1, 100);

    let mut total_inserted = 0usize;
    let mut total_updated = 0usize;
    let mut total_skipped = 0usize;
    let mut total_errors  = 0usize;

    use types::DatasetSummary;
    let mut per_dataset: Vec<DatasetSummary> = Vec::new();

    for d in datasets {
        let _ds_span = log.span_kv(&IngestPhase::Dataset, [("dataset_id", d.dataset_id.to_string()), ("hub_id", d.hub_id.clone())]).entered();
        let mut inserted = 0usize;
        let mut updated  = 0usize;
        let mut skipped  = 0usize;
        let mut errors   = 0usize;

        let mut offset = 0usize;
        'pages: while offset < args.limit {
            let length = page_size.min(args.limit - offset);

            let payload = {
                let _s = log.span_kv(&IngestPhase::FetchRows, [("offset", offset.to_string()), ("length", length.to_string())]).entered();
                fetch::fetch_rows(&client, &api_base, &d.hub_id, d.config.as_deref(), &d.split, offset, length).await?
            };
            let (page, dropped) = { let _s = log.span(&IngestPhase::ParseRows).entered(); parse::parse_rows(&payload)? };
            errors += dropped;
            if page.rows.is_empty() { break 'pages; }

            let fetched = page.rows.len();
            for row in page.rows {
                if args.force_refetch {
                    let _ws = log.span_kv(&IngestPhase::WriteExample, [("mode", "upsert".to_string())]).entered();
                    let inserted_row = write::upsert_example(pool, d.dataset_id, row.row_index, &row.fields).await?;
                    if inserted_row { inserted += 1; log.info_kv("➕ insert", [("row_index", row.row_index.to_string())]); }
                    else { updated += 1; log.info_kv("♻️ update", [("row_index", row.row_index.to_string())]); }
                } else {
                    let _ws = log.span_kv(&IngestPhase::WriteExample, [("mode", "insert".to_string())]).entered();
                    let did_insert = write::insert_example(pool, d.dataset_id, row.row_index, &row.fields).await?;
                    if did_insert { inserted += 1; log.info_kv("➕ insert", [("row_index", row.row_index.to_string())]); }
                    else { skipped += 1; log.info_kv("↩️ skip", [("row_index", row.row_index.to_string())]); }
                }
            }

            offset += fetched;
            if let Some(total) = page.num_rows_total {
                if offset as i64 >= total { break 'pages; }
            }
            if fetched < length { break 'pages; }
        }

        total_inserted += inserted;
        total_updated  += updated;
        total_skipped  += skipped;
        total_errors   += errors;
        log.dataset_summary(d.dataset_id, inserted, updated, skipped, errors);
        per_dataset.push(DatasetSummary { dataset_id: d.dataset_id, inserted, updated, skipped, errors });
    }

    log.totals(total_inserted, total_updated, total_skipped, total_errors);

    if telemetry::config::json_mode() {
        use types::{IngestTotals, IngestApply};
        let result = IngestApply {
            totals: IngestTotals { inserted: total_inserted, updated: total_updated, skipped: total_skipped, errors: total_errors },
            per_dataset,
        };
        log.result(&result)?;
    }
    Ok(())
}
