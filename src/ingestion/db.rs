use anyhow::Result;
use sqlx::{PgPool, Row};

pub struct IngestDatasetRow {
    pub dataset_id: i32,
    pub hub_id: String,
    pub config: Option<String>,
    pub split: String,
}

pub async fn select_datasets(pool: &PgPool, dataset: Option<i32>, hub_id: Option<&str>) -> Result<Vec<IngestDatasetRow>> {
    let rows = sqlx::query(
        r#"
        SELECT dataset_id, hub_id, config, split
        FROM tune.dataset
        WHERE
          ($1::INT4 IS NULL OR dataset_id = $1::INT4) AND
          ($2::TEXT IS NULL OR hub_id     = $2::TEXT) AND
          ($1::INT4 IS NOT NULL OR $2::TEXT IS NOT NULL OR COALESCE(is_active, TRUE))
        ORDER BY dataset_id
        "#,
    )
    .bind(dataset)
    .bind(hub_id)
    .fetch_all(pool)
    .await?;

    let out = rows
        .into_iter()
        .map(|r| IngestDatasetRow {
            dataset_id: r.get("dataset_id"),
            hub_id: r.get("hub_id"),
            config: r.get("config"),
            split: r.get("split"),
        })
        .collect();
    Ok(out)
}
