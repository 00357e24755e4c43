use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub async fn delete_error_examples(pool: &PgPool, cutoff: Option<DateTime<Utc>>, dataset: Option<i32>, max: i64) -> Result<u64> {
    let res = sqlx::query(
        r#"
        DELETE FROM tune.example
        WHERE example_id IN (
            SELECT example_id FROM tune.example
            WHERE status = 'error'
              AND ($1::timestamptz IS NULL OR fetched_at < $1)
              AND ($2::int IS NULL OR dataset_id = $2)
            LIMIT $3
        )
        "#,
    )
    .bind(cutoff)
    .bind(dataset)
    .bind(max)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_never_packed(pool: &PgPool, cutoff: Option<DateTime<Utc>>, dataset: Option<i32>, max: i64) -> Result<u64> {
    let res = sqlx::query(
        r#"
        DELETE FROM tune.example
        WHERE example_id IN (
            SELECT example_id FROM tune.example
            WHERE status = 'ingest'
              AND ($1::timestamptz IS NOT NULL AND fetched_at < $1)
              AND ($2::int IS NULL OR dataset_id = $2)
            LIMIT $3
        )
        "#,
    )
    .bind(cutoff)
    .bind(dataset)
    .bind(max)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn delete_bad_shards(pool: &PgPool, dataset: Option<i32>, max: i64) -> Result<u64> {
    let res = sqlx::query(
        r#"
        DELETE FROM tune.shard
        WHERE shard_id IN (
            SELECT shard_id FROM tune.shard
            WHERE (blocks <= 0 OR tokens <= 0)
              AND ($1::int IS NULL OR dataset_id = $1)
            LIMIT $2
        )
        "#,
    )
    .bind(dataset)
    .bind(max)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn mark_endpoints_deleted(pool: &PgPool, names: &[String]) -> Result<u64> {
    let res = sqlx::query(
        "UPDATE tune.endpoint SET status='deleted', deleted_at=now() WHERE name = ANY($1)",
    )
    .bind(names)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}

pub async fn mark_jobs_stopped(pool: &PgPool, names: &[String]) -> Result<u64> {
    let res = sqlx::query(
        "UPDATE tune.job SET status='stopped', finished_at=now() WHERE name = ANY($1)",
    )
    .bind(names)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}
