pub mod logic;
mod select;
mod shard;
mod db;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::pack::Phase as PackPhase;
use crate::template::PromptTemplate;
use crate::tokenizer::CausalTokenizer;
use crate::util::time::parse_since_opt;

use self::logic::BlockPacker;
use self::shard::{ShardMeta, ShardWriter};

#[derive(Args)]
pub struct PackCmd {
    #[arg(long)] dataset: Option<i32>,
    #[arg(long)] since: Option<String>,
    /// Tokenizer to pack with (the base model being fine-tuned)
    #[arg(long, default_value = crate::tokenizer::bloom::DEFAULT_MODEL_ID)] model_id: String,
    #[arg(long, default_value_t = 1536)] block_len: usize,
    #[arg(long, default_value_t = 256)] blocks_per_shard: usize,
    /// Examples per tokenizer batch
    #[arg(long, default_value_t = 64)] batch: usize,
    #[arg(long, default_value = "data/packed")] out_dir: String,
    #[arg(long, default_value_t = 10_000)] max: i64,
    #[arg(long, default_value_t = false)] force: bool,
    #[arg(long, default_value_t = false)] apply: bool,
    #[arg(long, default_value_t = 10)] plan_limit: usize,
}

pub async fn run(pool: &PgPool, args: PackCmd) -> Result<()> {
    let log = telemetry::pack();
    let _g = log.root_span_kv([
        ("dataset", format!("{:?}", args.dataset)),
        ("since", format!("{:?}", args.since)),
        ("model_id", args.model_id.clone()),
        ("block_len", args.block_len.to_string()),
        ("blocks_per_shard", args.blocks_per_shard.to_string()),
        ("batch", args.batch.to_string()),
        ("force", args.force.to_string()),
        ("apply", args.apply.to_string()),
    ]).entered();

    let Some(ds) = crate::dataset::db::resolve_dataset(pool, args.dataset).await? else {
        bail!("No dataset registered; run `tune dataset add` first");
    };

    let _s = log.span(&PackPhase::SelectExamples).entered();
    let since_ts = parse_since_opt(&args.since)?;
    let examples = select::select_examples(pool, ds.dataset_id, since_ts, args.force, args.max).await?;
    drop(_s);
    if examples.is_empty() {
        log.info(format!(
            "ℹ️  No examples to pack (status='ingest'{})",
            if args.since.is_some() { ", --since" } else { "" }
        ));
        return Ok(());
    }

    let template = PromptTemplate::parse(&ds.template).context("parse dataset template")?;

    if !args.apply {
        let _sp = log.span(&PackPhase::Plan).entered();
        // Always log plan summary
        log.info(format!(
            "📝 Pack plan — dataset={} examples={} block_len={} blocks_per_shard={} force={}",
            ds.dataset_id, examples.len(), args.block_len, args.blocks_per_shard, args.force
        ));
        for (example_id, _) in examples.iter().take(args.plan_limit) {
            log.info(format!("  example_id={}", example_id));
        }
        if examples.len() > args.plan_limit { log.info(format!("  ... ({} more)", examples.len() - args.plan_limit)); }
        log.info("   Use --apply to execute.");
        // Emit structured plan when in JSON mode (stdout)
        if telemetry::config::json_mode() {
            #[derive(Serialize)]
            struct PackPlan { dataset_id: i32, examples: usize, block_len: usize, blocks_per_shard: usize, force: bool, sample_example_ids: Vec<i64> }
            let sample_example_ids: Vec<i64> = examples.iter().take(args.plan_limit).map(|(id, _)| *id).collect();
            let plan = PackPlan {
                dataset_id: ds.dataset_id,
                examples: examples.len(),
                block_len: args.block_len,
                blocks_per_shard: args.blocks_per_shard,
                force: args.force,
                sample_example_ids,
            };
            log.plan(&plan)?;
        }
        return Ok(());
    }

    let tok = CausalTokenizer::new(&args.model_id)
        .with_context(|| format!("init tokenizer for {}", args.model_id))?;

    let out_dir = format!("{}/dataset-{}", args.out_dir.trim_end_matches('/'), ds.dataset_id);
    let start_index = db::next_shard_index(pool, ds.dataset_id).await?;
    let mut writer = ShardWriter::new(&out_dir, start_index, args.blocks_per_shard);
    let mut packer = BlockPacker::new(args.block_len);

    let mut packed_examples = 0usize;
    let mut errors = 0usize;
    let mut total_blocks = 0usize;
    let mut total_tokens = 0i64;
    let mut shards: Vec<i32> = Vec::new();

    for batch in examples.chunks(args.batch.max(1)) {
        // render each example through the dataset template, EOS-terminated
        let mut texts: Vec<String> = Vec::with_capacity(batch.len());
        let mut rendered_ids: Vec<i64> = Vec::with_capacity(batch.len());
        {
            let _sp = log.span(&PackPhase::Render).entered();
            for (example_id, fields) in batch {
                let Some(columns) = fields.as_object() else {
                    db::mark_error(pool, *example_id, "fields-not-object").await?;
                    errors += 1;
                    continue;
                };
                match template.render(columns) {
                    Ok(text) if !text.trim().is_empty() => {
                        texts.push(format!("{}{}", text, tok.eos_token()));
                        rendered_ids.push(*example_id);
                    }
                    Ok(_) => {
                        db::mark_error(pool, *example_id, "empty-render").await?;
                        errors += 1;
                    }
                    Err(e) => {
                        db::mark_error(pool, *example_id, &e.to_string()).await?;
                        errors += 1;
                    }
                }
            }
        }
        if texts.is_empty() { continue; }

        let _tk = log.span(&PackPhase::Tokenize).entered();
        let encoded = tok.encode_batch(&texts)
            .with_context(|| format!("tokenize batch of {}", texts.len()))?;
        drop(_tk);

        let _pb = log.span(&PackPhase::PackBlocks).entered();
        let blocks = packer.push_batch(encoded.iter().map(|(ids, mask)| (ids.as_slice(), mask.as_slice())));
        drop(_pb);

        let _ws = log.span(&PackPhase::WriteShard).entered();
        for meta in writer.push_blocks(blocks)? {
            record_shard(pool, &log, ds.dataset_id, args.block_len, &meta, &mut shards, &mut total_blocks, &mut total_tokens).await?;
        }
        drop(_ws);

        let _us = log.span(&PackPhase::UpdateStatus).entered();
        db::mark_packed(pool, &rendered_ids).await?;
        drop(_us);
        packed_examples += rendered_ids.len();
    }

    // flush the trailing partial shard of full blocks
    let remainder = packer.remainder_len();
    if let Some(meta) = writer.finish()? {
        let _ws = log.span(&PackPhase::WriteShard).entered();
        record_shard(pool, &log, ds.dataset_id, args.block_len, &meta, &mut shards, &mut total_blocks, &mut total_tokens).await?;
    }
    if remainder > 0 {
        log.info(format!("🪙 Dropped trailing remainder of {} token(s) (< block_len)", remainder));
    }

    log.info(format!(
        "📊 Pack totals — examples={} errors={} shards={} blocks={} tokens={}",
        packed_examples, errors, shards.len(), total_blocks, total_tokens
    ));

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct PackResult { dataset_id: i32, examples: usize, errors: usize, shards: Vec<i32>, blocks: usize, tokens: i64, remainder_dropped: usize }
        let res = PackResult {
            dataset_id: ds.dataset_id,
            examples: packed_examples,
            errors,
            shards,
            blocks: total_blocks,
            tokens: total_tokens,
            remainder_dropped: remainder,
        };
        let log = telemetry::pack();
        log.result(&res)?;
    }
    Ok(())
}

async fn record_shard(
    pool: &PgPool,
    log: &crate::telemetry::ctx::LogCtx<crate::telemetry::ops::pack::Pack>,
    dataset_id: i32,
    block_len: usize,
    meta: &ShardMeta,
    shards: &mut Vec<i32>,
    total_blocks: &mut usize,
    total_tokens: &mut i64,
) -> Result<()> {
    db::insert_shard(
        pool,
        dataset_id,
        meta.shard_index,
        &meta.path,
        meta.blocks,
        block_len as i32,
        meta.tokens,
        &meta.content,
    )
    .await?;
    shards.push(meta.shard_index);
    *total_blocks += meta.blocks as usize;
    *total_tokens += meta.tokens;
    log.info(format!("📦 shard-{:05} → {} block(s), {} token(s)", meta.shard_index, meta.blocks, meta.tokens));
    Ok(())
}
