use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::dataset::Phase as DatasetPhase;
use crate::template::PromptTemplate;

pub mod db;
pub mod types;

/// tune dataset add/ls
#[derive(Args)]
pub struct DatasetCmd {
    #[command(subcommand)]
    pub cmd: DatasetSub,
}

#[derive(Subcommand)]
pub enum DatasetSub {
    // register a dataset (plan-only by default; use --apply to write)
    Add {
        hub_id: String,
        #[arg(long)]
        config: Option<String>,
        #[arg(long, default_value = "train")]
        split: String,
        /// Prompt template with {field} placeholders; defaults to the
        /// dialogue-summarization template
        #[arg(long)]
        template: Option<String>,
        #[arg(long, default_value_t = true)]
        active: bool,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    // list registered datasets
    Ls {
        /// Filter by active status: true/false. Omit to show all.
        #[arg(long)]
        active: Option<bool>,
    },
}

pub async fn run(pool: &PgPool, args: DatasetCmd) -> Result<()> {
    let log = telemetry::dataset();
    let _g = log.root_span().entered();
    match args.cmd {
        DatasetSub::Add { hub_id, config, split, template, active, apply } =>
            add_dataset(pool, hub_id, config, split, template, active, apply).await?,
        DatasetSub::Ls { active } => ls_datasets(pool, active).await?,
    }
    Ok(())
}

async fn add_dataset(
    pool: &PgPool,
    hub_id: String,
    config: Option<String>,
    split: String,
    template: Option<String>,
    active: bool,
    apply: bool,
) -> Result<()> {
    let log = telemetry::dataset();
    let _g = log.root_span_kv([
        ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
        ("hub_id", hub_id.clone()),
        ("split", split.clone()),
        ("active", active.to_string()),
    ]).entered();

    let template = template.unwrap_or_else(|| crate::template::DEFAULT_TEMPLATE.to_string());

    // template validation (friendly error before DB I/O)
    let parsed = match PromptTemplate::parse(&template) {
        Ok(t) => t,
        Err(e) => bail!("Invalid template: {}", e),
    };
    if parsed.fields().is_empty() { bail!("Template has no {{field}} placeholders"); }

    if !apply {
        let _s = log.span(&DatasetPhase::Plan).entered();
        // Always log plan summary
        log.info(format!(
            "📝 Dataset plan — add hub_id={} config={:?} split={} fields={:?} active={}",
            hub_id, config, split, parsed.fields(), active
        ));
        log.info("   Use --apply to execute.");
        // Emit structured plan when in JSON mode (stdout)
        if telemetry::config::json_mode() {
            let plan = types::DatasetAddPlan {
                action: "add",
                hub_id: hub_id.clone(),
                config: config.clone(),
                split: split.clone(),
                fields: parsed.fields().to_vec(),
                active,
            };
            log.plan(&plan)?;
        }
        return Ok(());
    }
    let _s = log.span(&DatasetPhase::Add).entered();
    let inserted = db::upsert_dataset(pool, &hub_id, config.as_deref(), &split, &template, active).await?;
    if inserted { log.info("➕ Dataset added"); } else { log.info("♻️ Dataset updated"); }
    // Emit structured result when in JSON mode (stdout)
    if telemetry::config::json_mode() {
        let result = types::DatasetAddResult { inserted, hub_id, split };
        log.result(&result)?;
    }
    Ok(())
}

async fn ls_datasets(pool: &PgPool, active: Option<bool>) -> Result<()> {
    let log = telemetry::dataset();
    let _g = log.root_span_kv([("active", format!("{:?}", active))]).entered();
    let _s = log.span(&DatasetPhase::List).entered();
    let datasets = db::list_datasets(pool, active).await?;
    log.info("📚 Datasets:");
    for row in &datasets {
        log.info(format!(
            "[{}] {}:{} config={:?} active={:?} added_at={:?}",
            row.dataset_id, row.hub_id, row.split, row.config, row.is_active, row.added_at
        ));
    }
    // Emit structured list when in JSON mode (stdout)
    if telemetry::config::json_mode() {
        let list = types::DatasetList { datasets };
        log.result(&list)?;
    }
    Ok(())
}
