use anyhow::Result;
use sqlx::{PgPool, Row};

pub async fn mark_packed(pool: &PgPool, example_ids: &[i64]) -> Result<u64> {
    let res = sqlx::query("UPDATE tune.example SET status='packed', error_msg=NULL WHERE example_id = ANY($1)")
        .bind(example_ids)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn mark_error(pool: &PgPool, example_id: i64, msg: &str) -> Result<()> {
    sqlx::query("UPDATE tune.example SET status='error', error_msg=$2 WHERE example_id=$1")
        .bind(example_id)
        .bind(msg)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn next_shard_index(pool: &PgPool, dataset_id: i32) -> Result<i32> {
    let row = sqlx::query("SELECT COALESCE(MAX(shard_index) + 1, 0) AS next FROM tune.shard WHERE dataset_id = $1")
        .bind(dataset_id)
        .fetch_one(pool)
        .await?;
    Ok(row.get::<i32, _>("next"))
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_shard(
    pool: &PgPool,
    dataset_id: i32,
    shard_index: i32,
    path: &str,
    blocks: i32,
    block_len: i32,
    tokens: i64,
    content: &str,
) -> Result<i64> {
    let row = sqlx::query(
        r#"
        INSERT INTO tune.shard (dataset_id, shard_index, path, blocks, block_len, tokens, md5, status)
        VALUES ($1, $2, $3, $4, $5, $6, md5($7), 'packed')
        ON CONFLICT (dataset_id, shard_index) DO UPDATE
          SET path = EXCLUDED.path,
              blocks = EXCLUDED.blocks,
              block_len = EXCLUDED.block_len,
              tokens = EXCLUDED.tokens,
              md5 = EXCLUDED.md5,
              remote_uri = NULL,
              status = 'packed'
        RETURNING shard_id
        "#,
    )
    .bind(dataset_id)
    .bind(shard_index)
    .bind(path)
    .bind(blocks)
    .bind(block_len)
    .bind(tokens)
    .bind(content)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<i64, _>("shard_id"))
}
