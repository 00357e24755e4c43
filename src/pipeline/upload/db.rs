use anyhow::Result;
use sqlx::{PgPool, Row};

pub struct UploadShardRow {
    pub shard_id: i64,
    pub shard_index: i32,
    pub path: String,
    pub hub_id: String,
    pub split: String,
}

fn row_to_shard(r: sqlx::postgres::PgRow) -> UploadShardRow {
    UploadShardRow {
        shard_id: r.get("shard_id"),
        shard_index: r.get("shard_index"),
        path: r.get("path"),
        hub_id: r.get("hub_id"),
        split: r.get("split"),
    }
}

pub async fn count_candidates(pool: &PgPool, dataset: Option<i32>, force: bool) -> Result<i64> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS cnt
        FROM tune.shard s
        WHERE ($1::int IS NULL OR s.dataset_id = $1)
          AND ($2::bool OR s.status = 'packed')
        "#,
    )
    .bind(dataset)
    .bind(force)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<i64, _>("cnt"))
}

pub async fn list_candidate_ids(pool: &PgPool, dataset: Option<i32>, force: bool, limit: i64) -> Result<Vec<i64>> {
    let rows = sqlx::query(
        r#"
        SELECT s.shard_id
        FROM tune.shard s
        WHERE ($1::int IS NULL OR s.dataset_id = $1)
          AND ($2::bool OR s.status = 'packed')
        ORDER BY s.shard_id
        LIMIT $3
        "#,
    )
    .bind(dataset)
    .bind(force)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|r| r.get::<i64, _>("shard_id")).collect())
}

/// Fetch shards still waiting for upload, joined with their dataset so the
/// object key can be derived.
pub async fn fetch_missing(pool: &PgPool, dataset: Option<i32>, limit: i64) -> Result<Vec<UploadShardRow>> {
    let rows = sqlx::query(
        r#"
        SELECT s.shard_id, s.shard_index, s.path, d.hub_id, d.split
        FROM tune.shard s
        JOIN tune.dataset d USING (dataset_id)
        WHERE ($1::int IS NULL OR s.dataset_id = $1)
          AND s.status = 'packed'
        ORDER BY s.shard_id
        LIMIT $2
        "#,
    )
    .bind(dataset)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_to_shard).collect())
}

pub async fn fetch_all(pool: &PgPool, dataset: Option<i32>, max: Option<i64>) -> Result<Vec<UploadShardRow>> {
    let rows = sqlx::query(
        r#"
        SELECT s.shard_id, s.shard_index, s.path, d.hub_id, d.split
        FROM tune.shard s
        JOIN tune.dataset d USING (dataset_id)
        WHERE ($1::int IS NULL OR s.dataset_id = $1)
        ORDER BY s.shard_id
        LIMIT $2
        "#,
    )
    .bind(dataset)
    .bind(max.unwrap_or(i64::MAX))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_to_shard).collect())
}

pub async fn mark_uploaded(pool: &PgPool, shard_id: i64, remote_uri: &str) -> Result<()> {
    sqlx::query("UPDATE tune.shard SET status='uploaded', remote_uri=$2 WHERE shard_id=$1")
        .bind(shard_id)
        .bind(remote_uri)
        .execute(pool)
        .await?;
    Ok(())
}
