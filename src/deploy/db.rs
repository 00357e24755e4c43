use anyhow::Result;
use sqlx::{PgPool, Row};

use crate::platform::types::EndpointState;

pub struct JobRef {
    pub name: String,
    pub artifact_uri: String,
}

fn row_to_job(r: sqlx::postgres::PgRow) -> JobRef {
    JobRef { name: r.get("name"), artifact_uri: r.get("artifact_uri") }
}

pub async fn job_by_name(pool: &PgPool, name: &str) -> Result<Option<JobRef>> {
    let row = sqlx::query(
        "SELECT name, artifact_uri FROM tune.job WHERE name=$1 AND artifact_uri IS NOT NULL",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_job))
}

pub async fn latest_completed_job(pool: &PgPool) -> Result<Option<JobRef>> {
    let row = sqlx::query(
        r#"
        SELECT name, artifact_uri
        FROM tune.job
        WHERE status='completed' AND artifact_uri IS NOT NULL
        ORDER BY finished_at DESC NULLS LAST, job_id DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_job))
}

pub async fn insert_endpoint(
    pool: &PgPool,
    name: &str,
    job_name: &str,
    artifact_uri: &str,
    instance_type: &str,
    instance_count: i32,
    status: &str,
) -> Result<i64> {
    let row = sqlx::query(
        r#"
        INSERT INTO tune.endpoint (name, job_name, artifact_uri, instance_type, instance_count, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING endpoint_id
        "#,
    )
    .bind(name)
    .bind(job_name)
    .bind(artifact_uri)
    .bind(instance_type)
    .bind(instance_count)
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<i64, _>("endpoint_id"))
}

pub async fn update_endpoint_state(pool: &PgPool, name: &str, state: EndpointState) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tune.endpoint
        SET status = $2,
            deleted_at = CASE WHEN $3 THEN now() ELSE deleted_at END
        WHERE name = $1
        "#,
    )
    .bind(name)
    .bind(state.as_db_str())
    .bind(state == EndpointState::Deleted)
    .execute(pool)
    .await?;
    Ok(())
}
