use anyhow::Result;
use sqlx::{PgPool, Row};

use crate::dataset::types::DatasetRow;

pub async fn upsert_dataset(
    pool: &PgPool,
    hub_id: &str,
    config: Option<&str>,
    split: &str,
    template: &str,
    active: bool,
) -> Result<bool> {
    let row = sqlx::query(
        r#"
        INSERT INTO tune.dataset (hub_id, config, split, template, is_active)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (hub_id, split)
        DO UPDATE SET config = EXCLUDED.config,
                      template = EXCLUDED.template,
                      is_active = EXCLUDED.is_active
        RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(hub_id)
    .bind(config)
    .bind(split)
    .bind(template)
    .bind(active)
    .fetch_one(pool)
    .await?;
    Ok(row.get::<Option<bool>, _>("inserted").unwrap_or(false))
}

pub async fn list_datasets(pool: &PgPool, active: Option<bool>) -> Result<Vec<DatasetRow>> {
    let rows = sqlx::query(
        r#"
        SELECT dataset_id, hub_id, config, split, template,
               COALESCE(is_active, TRUE) AS is_active,
               added_at
        FROM tune.dataset
        WHERE ($1::bool IS NULL OR is_active = $1)
        ORDER BY dataset_id
        "#,
    )
    .bind(active)
    .fetch_all(pool)
    .await?;

    let datasets = rows
        .into_iter()
        .map(|r| DatasetRow {
            dataset_id: r.get("dataset_id"),
            hub_id: r.get("hub_id"),
            config: r.get("config"),
            split: r.get("split"),
            template: r.get("template"),
            is_active: Some(r.get::<bool, _>("is_active")),
            added_at: r.get("added_at"),
        })
        .collect();
    Ok(datasets)
}

/// Load one dataset registration by id, or the single active one when id is None.
pub async fn resolve_dataset(pool: &PgPool, dataset_id: Option<i32>) -> Result<Option<DatasetRow>> {
    let row = sqlx::query(
        r#"
        SELECT dataset_id, hub_id, config, split, template,
               COALESCE(is_active, TRUE) AS is_active,
               added_at
        FROM tune.dataset
        WHERE ($1::int IS NULL AND COALESCE(is_active, TRUE)) OR dataset_id = $1
        ORDER BY dataset_id
        LIMIT 1
        "#,
    )
    .bind(dataset_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| DatasetRow {
        dataset_id: r.get("dataset_id"),
        hub_id: r.get("hub_id"),
        config: r.get("config"),
        split: r.get("split"),
        template: r.get("template"),
        is_active: Some(r.get::<bool, _>("is_active")),
        added_at: r.get("added_at"),
    }))
}
