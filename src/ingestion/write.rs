use anyhow::Result;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row};

pub async fn upsert_example(
    pool: &PgPool,
    dataset_id: i32,
    row_index: i64,
    fields: &Map<String, Value>,
) -> Result<bool> {
    let fields = Value::Object(fields.clone());
    let row = sqlx::query(
        r#"
        INSERT INTO tune.example (dataset_id, row_index, fields, content_hash, status, fetched_at)
        VALUES ($1, $2, $3, md5($3::text), 'ingest', now())
        ON CONFLICT (dataset_id, row_index) DO UPDATE
          SET fields       = EXCLUDED.fields,
              content_hash = EXCLUDED.content_hash,
              status       = 'ingest',
              error_msg    = NULL,
              fetched_at   = now()
        RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(dataset_id)
    .bind(row_index)
    .bind(&fields)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<Option<bool>, _>("inserted").unwrap_or(false))
}

pub async fn insert_example(
    pool: &PgPool,
    dataset_id: i32,
    row_index: i64,
    fields: &Map<String, Value>,
) -> Result<bool> {
    let fields = Value::Object(fields.clone());
    let exec = sqlx::query(
        r#"
        INSERT INTO tune.example (dataset_id, row_index, fields, content_hash, status, fetched_at)
        VALUES ($1, $2, $3, md5($3::text), 'ingest', now())
        ON CONFLICT (dataset_id, row_index) DO NOTHING
        "#,
    )
    .bind(dataset_id)
    .bind(row_index)
    .bind(&fields)
    .execute(pool)
    .await?;
    Ok(exec.rows_affected() == 1)
}
