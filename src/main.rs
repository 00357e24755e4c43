use clap::{Parser, Subcommand};
use sqlx::PgPool;
use anyhow::Result;
use dotenvy::dotenv;
use std::env;

mod init;
mod dataset;
mod ingestion;
mod template;
mod tokenizer;
mod pipeline;
mod platform;
mod train;
mod deploy;
mod query;
mod stats;
mod maintenance;
mod telemetry;
mod util;

#[derive(Parser)]
#[command(name = "tune", about = "LoRA fine-tuning pipeline CLI")]
struct Cli {
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Init(init::InitCmd),
    Dataset(dataset::DatasetCmd),
    Ingest(ingestion::IngestCmd),
    Pack(pipeline::pack::PackCmd),
    Upload(pipeline::upload::UploadCmd),
    Train(train::TrainCmd),
    Deploy(deploy::DeployCmd),
    Query(query::QueryCmd),
    Stats(stats::StatsCmd),
    Gc(maintenance::gc::GcCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and TUNE_LOG_FORMAT
    telemetry::config::init_tracing();
    let dsn = cli
        .dsn
        .or_else(|| env::var("DATABASE_URL").ok())
        .expect("Please provide --dsn or set DATABASE_URL in .env");

    let pool = PgPool::connect(&dsn).await?;

    match cli.command {
        Commands::Init(args) => init::run(&pool, args).await?,
        Commands::Dataset(args) => dataset::run(&pool, args).await?,
        Commands::Ingest(args) => ingestion::run(&pool, args).await?,
        Commands::Pack(args) => pipeline::pack::run(&pool, args).await?,
        Commands::Upload(args) => pipeline::upload::run(&pool, args).await?,
        Commands::Train(args) => train::run(&pool, args).await?,
        Commands::Deploy(args) => deploy::run(&pool, args).await?,
        Commands::Query(args) => query::run(&pool, args).await?,
        Commands::Stats(args) => stats::run(&pool, args).await?,
        Commands::Gc(args) => maintenance::gc::run(&pool, args).await?,
    }

    Ok(())
}
