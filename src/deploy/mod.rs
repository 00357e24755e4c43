mod db;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::platform::types::{EndpointSpec, EndpointState};
use crate::platform::{Backend, PlatformClient};
use crate::telemetry::{self};
use crate::telemetry::ops::deploy::Phase as DeployPhase;

#[derive(Args)]
pub struct DeployCmd {
    /// Training job to deploy; defaults to the most recent completed job
    #[arg(long)] job: Option<String>,
    /// Endpoint name; derived from the job name if omitted
    #[arg(long)] name: Option<String>,
    #[arg(long, default_value = "ml.g5.4xlarge")] instance_type: String,
    #[arg(long, default_value_t = 1)] instance_count: u32,
    /// Poll until the endpoint is in service
    #[arg(long, default_value_t = false)] wait: bool,
    #[arg(long, default_value_t = 15)] poll_secs: u64,
    #[arg(long, default_value_t = false)] apply: bool,
}

pub async fn run(pool: &PgPool, args: DeployCmd) -> Result<()> {
    let log = telemetry::deploy();
    let _g = log.root_span_kv([
        ("job", format!("{:?}", args.job)),
        ("instance_type", args.instance_type.clone()),
        ("wait", args.wait.to_string()),
        ("apply", args.apply.to_string()),
    ]).entered();

    let job = match &args.job {
        Some(name) => db::job_by_name(pool, name)
            .await?
            .with_context(|| format!("job '{}' not found or has no artifact", name))?,
        None => match db::latest_completed_job(pool).await? {
            Some(j) => j,
            None => bail!("No completed training job to deploy; run `tune train --apply --wait` first"),
        },
    };

    let name = args.name.clone().unwrap_or_else(|| {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-ep-{}", job.name, &suffix[..8])
    });

    let spec = EndpointSpec {
        name: name.clone(),
        artifact_uri: job.artifact_uri.clone(),
        instance_type: args.instance_type.clone(),
        initial_instance_count: args.instance_count,
    };

    if !args.apply {
        let _sp = log.span(&DeployPhase::Plan).entered();
        log.info(format!(
            "📝 Deploy plan — endpoint={} job={} artifact={} {}x{}",
            name, job.name, job.artifact_uri, args.instance_count, args.instance_type
        ));
        log.info("   Use --apply to create the endpoint.");
        if telemetry::config::json_mode() {
            log.plan(&spec)?;
        }
        return Ok(());
    }

    let client = PlatformClient::from_env().context("init platform client")?;

    let _cr = log.span_kv(&DeployPhase::Create, [("name", name.clone())]).entered();
    let mut status = client.create_endpoint(spec).await?;
    drop(_cr);

    let _rec = log.span(&DeployPhase::Record).entered();
    db::insert_endpoint(
        pool,
        &name,
        &job.name,
        &job.artifact_uri,
        &args.instance_type,
        args.instance_count as i32,
        status.state.as_db_str(),
    )
    .await?;
    drop(_rec);
    log.info(format!("🛰️  Creating endpoint {} state={:?}", name, status.state));

    if args.wait {
        let _pl = log.span(&DeployPhase::Poll).entered();
        while !status.state.is_terminal() {
            tokio::time::sleep(Duration::from_secs(args.poll_secs.max(1))).await;
            let next = client.describe_endpoint(&name).await?;
            if next.state != status.state {
                log.info(format!("⏳ {} state={:?}", name, next.state));
                db::update_endpoint_state(pool, &name, next.state).await?;
            }
            status = next;
        }

        match status.state {
            EndpointState::InService => log.info(format!("✅ Endpoint {} is in service", name)),
            EndpointState::Failed => log.error(format!(
                "❌ Endpoint {} failed: {}",
                name,
                status.failure_reason.as_deref().unwrap_or("(no reason)")
            )),
            _ => log.warn(format!("⚠️  Endpoint {} ended as {:?}", name, status.state)),
        }
    }

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct DeployResult { name: String, job: String, state: EndpointState, failure_reason: Option<String> }
        let res = DeployResult {
            name,
            job: job.name,
            state: status.state,
            failure_reason: status.failure_reason.clone(),
        };
        log.result(&res)?;
    }
    Ok(())
}
