use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

pub async fn count_live_endpoints(pool: &PgPool, cutoff: Option<DateTime<Utc>>, all: bool) -> Result<i64> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS cnt
        FROM tune.endpoint
        WHERE status IN ('creating', 'in_service')
          AND ($2::bool OR ($1::timestamptz IS NOT NULL AND created_at < $1))
        "#,
    )
    .bind(cutoff)
    .bind(all)
    .fetch_one(pool)
    .await?;
    Ok(row.get("cnt"))
}

pub async fn list_live_endpoints(pool: &PgPool, cutoff: Option<DateTime<Utc>>, all: bool, max: i64) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT name
        FROM tune.endpoint
        WHERE status IN ('creating', 'in_service')
          AND ($2::bool OR ($1::timestamptz IS NOT NULL AND created_at < $1))
        ORDER BY endpoint_id
        LIMIT $3
        "#,
    )
    .bind(cutoff)
    .bind(all)
    .bind(max)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.get("name")).collect())
}

pub async fn count_stale_jobs(pool: &PgPool, cutoff: Option<DateTime<Utc>>) -> Result<i64> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS cnt
        FROM tune.job
        WHERE status IN ('submitted', 'in_progress')
          AND ($1::timestamptz IS NOT NULL AND submitted_at < $1)
        "#,
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;
    Ok(row.get("cnt"))
}

pub async fn list_stale_jobs(pool: &PgPool, cutoff: Option<DateTime<Utc>>, max: i64) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        SELECT name
        FROM tune.job
        WHERE status IN ('submitted', 'in_progress')
          AND ($1::timestamptz IS NOT NULL AND submitted_at < $1)
        ORDER BY job_id
        LIMIT $2
        "#,
    )
    .bind(cutoff)
    .bind(max)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.get("name")).collect())
}

pub async fn count_error_examples(pool: &PgPool, cutoff: Option<DateTime<Utc>>, dataset: Option<i32>) -> Result<i64> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS cnt
        FROM tune.example
        WHERE status = 'error'
          AND ($1::timestamptz IS NULL OR fetched_at < $1)
          AND ($2::int IS NULL OR dataset_id = $2)
        "#,
    )
    .bind(cutoff)
    .bind(dataset)
    .fetch_one(pool)
    .await?;
    Ok(row.get("cnt"))
}

pub async fn count_never_packed(pool: &PgPool, cutoff: Option<DateTime<Utc>>, dataset: Option<i32>) -> Result<i64> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS cnt
        FROM tune.example
        WHERE status = 'ingest'
          AND ($1::timestamptz IS NOT NULL AND fetched_at < $1)
          AND ($2::int IS NULL OR dataset_id = $2)
        "#,
    )
    .bind(cutoff)
    .bind(dataset)
    .fetch_one(pool)
    .await?;
    Ok(row.get("cnt"))
}

pub async fn count_bad_shards(pool: &PgPool, dataset: Option<i32>) -> Result<i64> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS cnt
        FROM tune.shard
        WHERE (blocks <= 0 OR tokens <= 0)
          AND ($1::int IS NULL OR dataset_id = $1)
        "#,
    )
    .bind(dataset)
    .fetch_one(pool)
    .await?;
    Ok(row.get("cnt"))
}
