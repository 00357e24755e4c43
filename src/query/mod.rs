mod db;
mod post;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::time::Instant;

use crate::platform::types::{GenerationParameters, InvocationRequest};
use crate::platform::{Backend, PlatformClient};
use crate::telemetry::{self};
use crate::telemetry::ops::query::Phase as QueryPhase;
use crate::template::PromptTemplate;

#[derive(Args)]
pub struct QueryCmd {
    /// Endpoint name; defaults to the most recent endpoint in service
    #[arg(long)] endpoint: Option<String>,
    /// Dialogue to summarize through the dataset template
    #[arg(long)] dialogue: Option<String>,
    /// Raw prompt override (skips templating)
    #[arg(long)] prompt: Option<String>,
    #[arg(long, default_value_t = 256)] max_new_tokens: u32,
    #[arg(long, default_value_t = 0.9)] temperature: f32,
    #[arg(long, default_value_t = 0.9)] top_p: f32,
    /// Greedy decoding instead of sampling
    #[arg(long, default_value_t = false)] greedy: bool,
    #[arg(long, default_value = "</s>")] stop: String,
}

pub async fn run(pool: &PgPool, args: QueryCmd) -> Result<()> {
    let t0 = Instant::now();
    let log = telemetry::query();
    let _g = log.root_span_kv([
        ("endpoint", format!("{:?}", args.endpoint)),
        ("max_new_tokens", args.max_new_tokens.to_string()),
        ("temperature", args.temperature.to_string()),
        ("top_p", args.top_p.to_string()),
        ("greedy", args.greedy.to_string()),
    ]).entered();

    let _rs = log.span(&QueryPhase::Resolve).entered();
    let Some(ep) = db::resolve_endpoint(pool, args.endpoint.as_deref()).await? else {
        bail!("No endpoint in service; run `tune deploy --apply --wait` first");
    };
    drop(_rs);

    let _bp = log.span(&QueryPhase::BuildPrompt).entered();
    let prompt = match (&args.prompt, &args.dialogue) {
        (Some(raw), _) => raw.clone(),
        (None, Some(dialogue)) => {
            let raw = ep.template.as_deref().unwrap_or(crate::template::DEFAULT_TEMPLATE);
            let template = PromptTemplate::parse(raw).context("parse endpoint template")?;
            let inputs: Vec<&String> = template.fields().iter().take(template.fields().len().saturating_sub(1)).collect();
            if inputs.len() != 1 {
                bail!("Template has {} input field(s); pass --prompt instead", inputs.len());
            }
            let mut columns = Map::new();
            columns.insert(inputs[0].clone(), Value::String(dialogue.clone()));
            template.render_prompt(&columns)?
        }
        (None, None) => bail!("Provide --dialogue or --prompt"),
    };
    drop(_bp);

    let client = PlatformClient::from_env().context("init platform client")?;
    let request = InvocationRequest {
        inputs: prompt.clone(),
        parameters: GenerationParameters {
            max_new_tokens: args.max_new_tokens,
            temperature: args.temperature,
            top_p: args.top_p,
            do_sample: !args.greedy,
            stop: Some(vec![args.stop.clone()]),
        },
    };

    let _iv = log.span_kv(&QueryPhase::Invoke, [("endpoint", ep.name.clone())]).entered();
    let response = client.invoke_endpoint(&ep.name, request).await?;
    drop(_iv);

    let _ps = log.span(&QueryPhase::Post).entered();
    let cleaned = post::clean_generation(&prompt, &response.generated_text, &args.stop);
    drop(_ps);

    log.info(format!("🧠 Endpoint: {}", ep.name));
    log.info(format!("💬 {}", cleaned));

    if telemetry::config::json_mode() {
        #[derive(Serialize)]
        struct QueryResult { endpoint: String, prompt: String, generated_text: String, cleaned: String }
        let res = QueryResult {
            endpoint: ep.name,
            prompt,
            generated_text: response.generated_text,
            cleaned,
        };
        log.result_timed(&res, t0)?;
    }
    Ok(())
}
