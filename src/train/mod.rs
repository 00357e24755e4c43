mod db;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::platform::types::{Hyperparameters, JobState, TrainingJobSpec};
use crate::platform::{Backend, PlatformClient};
use crate::telemetry::{self};
use crate::telemetry::ops::train::Phase as TrainPhase;

#[derive(Args)]
pub struct TrainCmd {
    #[arg(long)] dataset: Option<i32>,
    /// Job name; generated from the base model + a short uuid if omitted
    #[arg(long)] name: Option<String>,
    #[arg(long, default_value = crate::tokenizer::bloom::DEFAULT_MODEL_ID)] base_model: String,
    /// Training input prefix; defaults to the uploaded shard prefix
    #[arg(long)] input_uri: Option<String>,
    #[arg(long, default_value_t = 3)] epochs: u32,
    #[arg(long, default_value_t = 2e-4)] learning_rate: f64,
    #[arg(long, default_value_t = 4)] per_device_batch: u32,
    #[arg(long, default_value_t = 16)] lora_r: u32,
    #[arg(long, default_value_t = 32)] lora_alpha: u32,
    #[arg(long, default_value_t = 0.05)] lora_dropout: f64,
    /// Keep base weights in full precision instead of int-8
    #[arg(long, default_value_t = false)] no_int8: bool,
    #[arg(long, default_value = "ml.g5.2xlarge")] instance_type: String,
    #[arg(long, default_value_t = 1)] instance_count: u32,
    /// Poll until the job reaches a terminal state
    #[arg(long, default_value_t = false)] wait: bool,
    #[arg(long, default_value_t = 30)] poll_secs: u64,
    #[arg(long, default_value_t = false)] apply: bool,
}

pub async fn run(pool: &PgPool, args: TrainCmd) -> Result<()> {
    let log = telemetry::train();
    let _g = log.root_span_kv([
        ("dataset", format!("{:?}", args.dataset)),
        ("base_model", args.base_model.clone()),
        ("instance_type", args.instance_type.clone()),
        ("wait", args.wait.to_string()),
        ("apply", args.apply.to_string()),
    ]).entered();

    let Some(ds) = crate::dataset::db::resolve_dataset(pool, args.dataset).await? else {
        bail!("No dataset registered; run `tune dataset add` first");
    };

    let _bs = log.span(&TrainPhase::BuildSpec).entered();
    let input_uri = match &args.input_uri {
        Some(uri) => uri.clone(),
        None => {
            let uploaded = db::count_uploaded(pool, ds.dataset_id).await?;
            if uploaded == 0 {
                bail!("No uploaded shards for dataset {}; run `tune upload --apply` first", ds.dataset_id);
            }
            db::input_prefix(pool, ds.dataset_id)
                .await?
                .context("uploaded shards have no remote_uri")?
        }
    };

    let name = args.name.clone().unwrap_or_else(|| {
        let tail = args.base_model.rsplit('/').next().unwrap_or(&args.base_model);
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-lora-{}", tail, &suffix[..8])
    });

    let spec = TrainingJobSpec {
        name: name.clone(),
        base_model: args.base_model.clone(),
        input_uri: input_uri.clone(),
        instance_type: args.instance_type.clone(),
        instance_count: args.instance_count,
        hyperparameters: Hyperparameters {
            epochs: args.epochs,
            learning_rate: args.learning_rate,
            per_device_train_batch_size: args.per_device_batch,
            lora_r: args.lora_r,
            lora_alpha: args.lora_alpha,
            lora_dropout: args.lora_dropout,
            load_in_8bit: !args.no_int8,
        },
    };
    drop(_bs);

    if !args.apply {
        let _sp = log.span(&TrainPhase::Plan).entered();
        log.info(format!(
            "📝 Train plan — name={} base_model={} input={} {}x{}",
            name, args.base_model, input_uri, args.instance_count, args.instance_type
        ));
        log.info(format!(
            "   epochs={} lr={} batch={} lora(r={} alpha={} dropout={}) int8={}",
            args.epochs, args.learning_rate, args.per_device_batch,
            args.lora_r, args.lora_alpha, args.lora_dropout, !args.no_int8
        ));
        log.info("   Use --apply to submit.");
        if telemetry::config::json_mode() {
            log.plan(&spec)?;
        }
        return Ok(());
    }

    let client = PlatformClient::from_env().context("init platform client")?;

    let _sub = log.span_kv(&TrainPhase::Submit, [("name", name.clone())]).entered();
    let mut status = client.create_training_job(spec.clone()).await?;
    drop(_sub);

    let _rec = log.span(&TrainPhase::Record).entered();
    db::insert_job(
        pool,
        &name,
        ds.dataset_id,
        &args.base_model,
        &input_uri,
        &args.instance_type,
        args.instance_count as i32,
        &serde_json::to_value(&spec.hyperparameters)?,
        status.state.as_db_str(),
    )
    .await?;
    drop(_rec);
    log.info(format!("🚀 Submitted training job {} state={:?}", name, status.state));

    if args.wait {
        let _pl = log.span(&TrainPhase::Poll).entered();
        while !status.state.is_terminal() {
            tokio::time::sleep(Duration::from_secs(args.poll_secs.max(1))).await;
            let next = client.describe_training_job(&name).await?;
            if next.state != status.state {
                log.info(format!("⏳ {} state={:?}", name, next.state));
                db::update_job_state(
                    pool,
                    &name,
                    next.state,
                    next.failure_reason.as_deref(),
                    next.artifact_uri.as_deref(),
                )
                .await?;
            }
            status = next;
        }

        match status.state {
            JobState::Completed => log.info(format!(
                "✅ Job {} completed — artifact={}",
                name,
                status.artifact_uri.as_deref().unwrap_or("(none)")
            )),
            JobState::Failed => log.error(format!(
                "❌ Job {} failed: {}",
                name,
                status.failure_reason.as_deref().unwrap_or("(no reason)")
            )),
            _ => log.warn(format!("⚠️  Job {} ended as {:?}", name, status.state)),
        }
    }

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct TrainResult { name: String, state: JobState, artifact_uri: Option<String>, failure_reason: Option<String> }
        let res = TrainResult {
            name,
            state: status.state,
            artifact_uri: status.artifact_uri.clone(),
            failure_reason: status.failure_reason.clone(),
        };
        log.result(&res)?;
    }
    Ok(())
}
