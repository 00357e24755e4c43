use anyhow::Result;
use sqlx::PgPool;

/// Normalize pipeline statuses that drifted from reality:
/// - examples marked 'packed' in datasets that have no shards go back to 'ingest'
/// - shards marked 'uploaded' without a remote_uri go back to 'packed'
pub async fn fix_statuses(pool: &PgPool, dataset: Option<i32>) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tune.example e
        SET status = 'ingest'
        WHERE e.status = 'packed'
          AND ($1::int IS NULL OR e.dataset_id = $1)
          AND NOT EXISTS (SELECT 1 FROM tune.shard s WHERE s.dataset_id = e.dataset_id)
        "#,
    )
    .bind(dataset)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        UPDATE tune.shard
        SET status = 'packed'
        WHERE status = 'uploaded'
          AND remote_uri IS NULL
          AND ($1::int IS NULL OR dataset_id = $1)
        "#,
    )
    .bind(dataset)
    .execute(pool)
    .await?;
    Ok(())
}
