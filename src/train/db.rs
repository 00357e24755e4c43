use anyhow::Result;
use sqlx::{PgPool, Row};

use crate::platform::types::JobState;

pub async fn count_uploaded(pool: &PgPool, dataset_id: i32) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS cnt FROM tune.shard WHERE dataset_id=$1 AND status='uploaded'")
        .bind(dataset_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i64, _>("cnt"))
}

/// Derive the training input prefix from the first uploaded shard's URI.
pub async fn input_prefix(pool: &PgPool, dataset_id: i32) -> Result<Option<String>> {
    let row = sqlx::query(
        r#"
        SELECT remote_uri
        FROM tune.shard
        WHERE dataset_id=$1 AND status='uploaded' AND remote_uri IS NOT NULL
        ORDER BY shard_index
        LIMIT 1
        "#,
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    Ok(row
        .and_then(|r| r.get::<Option<String>, _>("remote_uri"))
        .and_then(|uri| uri.rsplit_once('/').map(|(prefix, _)| format!("{}/", prefix))))
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_job(
    pool: &PgPool,
    name: &str,
    dataset_id: i32,
    base_model: &str,
    input_uri: &str,
    instance_type: &str,
    instance_count: i32,
    hyperparameters: &serde_json::Value,
    status: &str,
) -> Result<i64> {
    let row = sqlx::query(
        r#"
        INSERT INTO tune.job (name, dataset_id, base_model, input_uri, instance_type, instance_count, hyperparameters, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING job_id
        "#,
    )
    .bind(name)
    .bind(dataset_id)
    .bind(base_model)
    .bind(input_uri)
    .bind(instance_type)
    .bind(instance_count)
    .bind(hyperparameters)
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<i64, _>("job_id"))
}

pub async fn update_job_state(
    pool: &PgPool,
    name: &str,
    state: JobState,
    failure_reason: Option<&str>,
    artifact_uri: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tune.job
        SET status = $2,
            failure_reason = $3,
            artifact_uri = COALESCE($4, artifact_uri),
            finished_at = CASE WHEN $5 THEN now() ELSE finished_at END
        WHERE name = $1
        "#,
    )
    .bind(name)
    .bind(state.as_db_str())
    .bind(failure_reason)
    .bind(artifact_uri)
    .bind(state.is_terminal())
    .execute(pool)
    .await?;
    Ok(())
}
