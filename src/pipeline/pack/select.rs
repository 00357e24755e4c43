use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

// Select candidate examples to pack. Row order is preserved so the packed
// token stream matches the dataset order.
pub async fn select_examples(
    pool: &PgPool,
    dataset_id: i32,
    since: Option<DateTime<Utc>>,
    force: bool,
    max: i64,
) -> Result<Vec<(i64, serde_json::Value)>> {
    let rows = sqlx::query(
        r#"
        SELECT example_id, fields
        FROM tune.example
        WHERE dataset_id = $1
          AND ($3::bool OR status = 'ingest')
          AND ($2::timestamptz IS NULL OR fetched_at >= $2)
        ORDER BY row_index ASC
        LIMIT $4
        "#,
    )
    .bind(dataset_id)
    .bind(since)
    .bind(force)
    .bind(max)
    .fetch_all(pool)
    .await?;

    let examples = rows
        .into_iter()
        .map(|row| (row.get::<i64, _>("example_id"), row.get::<serde_json::Value, _>("fields")))
        .collect();
    Ok(examples)
}
