use anyhow::Result;
use clap::Args;
use sqlx::PgPool;

use crate::telemetry::{self};
use crate::telemetry::ops::init::Phase as InitPhase;

#[derive(Args)]
pub struct InitCmd {}

pub async fn run(pool: &PgPool, _args: InitCmd) -> Result<()> {
    let log = telemetry::init();
    let _g = log.root_span().entered();

    // Apply any pending migrations (idempotent)
    let _m = log.span(&InitPhase::Migrate).entered();
    sqlx::migrate!().run(pool).await?;
    drop(_m);

    log.info("✅ Schema initialized (migrations applied)");
    Ok(())
}
