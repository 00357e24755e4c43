use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::stats::types::*;

pub async fn fetch_datasets(pool: &PgPool) -> Result<Vec<StatsDatasetRow>> {
    let rows = sqlx::query(
        r#"
        SELECT dataset_id, hub_id, split, COALESCE(is_active, TRUE) AS is_active, added_at
        FROM tune.dataset
        ORDER BY dataset_id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| StatsDatasetRow {
            dataset_id: r.get("dataset_id"),
            hub_id: r.get("hub_id"),
            split: r.get("split"),
            is_active: Some(r.get::<bool, _>("is_active")),
            added_at: r.get("added_at"),
        })
        .collect())
}

pub async fn examples_by_status(pool: &PgPool, dataset: Option<i32>) -> Result<Vec<StatusCount>> {
    let rows = sqlx::query(
        r#"
        SELECT status, COUNT(*) AS cnt
        FROM tune.example
        WHERE ($1::int IS NULL OR dataset_id = $1)
        GROUP BY status
        ORDER BY status
        "#,
    )
    .bind(dataset)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| StatusCount { status: r.get("status"), cnt: r.get("cnt") })
        .collect())
}

pub async fn last_fetched(pool: &PgPool) -> Result<Option<DateTime<Utc>>> {
    let row = sqlx::query("SELECT MAX(fetched_at) AS last FROM tune.example")
        .fetch_one(pool)
        .await?;
    Ok(row.get("last"))
}

pub async fn shards_summary(pool: &PgPool, dataset: Option<i32>) -> Result<ShardsSummary> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS total,
               COALESCE(SUM(blocks), 0)::bigint AS blocks,
               COALESCE(SUM(tokens), 0)::bigint AS tokens
        FROM tune.shard
        WHERE ($1::int IS NULL OR dataset_id = $1)
        "#,
    )
    .bind(dataset)
    .fetch_one(pool)
    .await?;
    Ok(ShardsSummary {
        total: row.get("total"),
        blocks: row.get("blocks"),
        tokens: row.get("tokens"),
    })
}

pub async fn upload_coverage(pool: &PgPool, dataset: Option<i32>) -> Result<UploadCoverage> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS shards,
               COUNT(*) FILTER (WHERE status = 'uploaded') AS uploaded
        FROM tune.shard
        WHERE ($1::int IS NULL OR dataset_id = $1)
        "#,
    )
    .bind(dataset)
    .fetch_one(pool)
    .await?;
    let shards: i64 = row.get("shards");
    let uploaded: i64 = row.get("uploaded");
    let pct = if shards > 0 { uploaded as f64 * 100.0 / shards as f64 } else { 0.0 };
    Ok(UploadCoverage { uploaded, shards, pct, missing: shards - uploaded })
}

pub async fn jobs_by_status(pool: &PgPool) -> Result<Vec<StatusCount>> {
    let rows = sqlx::query(
        "SELECT status, COUNT(*) AS cnt FROM tune.job GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| StatusCount { status: r.get("status"), cnt: r.get("cnt") })
        .collect())
}

fn row_to_job(r: sqlx::postgres::PgRow) -> StatsJobRow {
    StatsJobRow {
        name: r.get("name"),
        base_model: r.get("base_model"),
        status: r.get("status"),
        instance_type: r.get("instance_type"),
        submitted_at: r.get("submitted_at"),
        finished_at: r.get("finished_at"),
        artifact_uri: r.get("artifact_uri"),
    }
}

pub async fn last_job(pool: &PgPool) -> Result<Option<StatsJobRow>> {
    let row = sqlx::query(
        r#"
        SELECT name, base_model, status, instance_type, submitted_at, finished_at, artifact_uri
        FROM tune.job
        ORDER BY job_id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_job))
}

pub async fn job_by_name(pool: &PgPool, name: &str) -> Result<Option<(StatsJobRow, serde_json::Value)>> {
    let row = sqlx::query(
        r#"
        SELECT name, base_model, status, instance_type, submitted_at, finished_at, artifact_uri,
               hyperparameters, failure_reason
        FROM tune.job
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| {
        let hp: serde_json::Value = r.get("hyperparameters");
        (row_to_job(r), hp)
    }))
}

pub async fn endpoints_by_status(pool: &PgPool) -> Result<Vec<StatusCount>> {
    let rows = sqlx::query(
        "SELECT status, COUNT(*) AS cnt FROM tune.endpoint GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| StatusCount { status: r.get("status"), cnt: r.get("cnt") })
        .collect())
}

fn row_to_endpoint(r: sqlx::postgres::PgRow) -> StatsEndpointRow {
    StatsEndpointRow {
        name: r.get("name"),
        job_name: r.get("job_name"),
        status: r.get("status"),
        instance_type: r.get("instance_type"),
        created_at: r.get("created_at"),
    }
}

pub async fn live_endpoints(pool: &PgPool) -> Result<Vec<StatsEndpointRow>> {
    let rows = sqlx::query(
        r#"
        SELECT name, job_name, status, instance_type, created_at
        FROM tune.endpoint
        WHERE status IN ('creating', 'in_service')
        ORDER BY endpoint_id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_to_endpoint).collect())
}

pub async fn endpoint_by_name(pool: &PgPool, name: &str) -> Result<Option<StatsEndpointRow>> {
    let row = sqlx::query(
        r#"
        SELECT name, job_name, status, instance_type, created_at
        FROM tune.endpoint
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_endpoint))
}

pub async fn shard_list(pool: &PgPool, dataset: i32, limit: i64) -> Result<Vec<(i32, i32, String, Option<String>)>> {
    let rows = sqlx::query(
        r#"
        SELECT shard_index, blocks, status, remote_uri
        FROM tune.shard
        WHERE dataset_id = $1
        ORDER BY shard_index
        LIMIT $2
        "#,
    )
    .bind(dataset)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|r| (
            r.get::<i32, _>("shard_index"),
            r.get::<i32, _>("blocks"),
            r.get::<String, _>("status"),
            r.get::<Option<String>, _>("remote_uri"),
        ))
        .collect())
}
