use anyhow::Result;
use sqlx::{PgPool, Row};

pub struct QueryEndpointRow {
    pub name: String,
    // template travels endpoint -> job -> dataset; None if the chain broke
    pub template: Option<String>,
}

/// Resolve an endpoint by name, or the most recent one in service.
pub async fn resolve_endpoint(pool: &PgPool, name: Option<&str>) -> Result<Option<QueryEndpointRow>> {
    let row = sqlx::query(
        r#"
        SELECT e.name, d.template
        FROM tune.endpoint e
        LEFT JOIN tune.job j ON j.name = e.job_name
        LEFT JOIN tune.dataset d ON d.dataset_id = j.dataset_id
        WHERE ($1::text IS NULL AND e.status = 'in_service') OR e.name = $1
        ORDER BY e.endpoint_id DESC
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| QueryEndpointRow {
        name: r.get("name"),
        template: r.get("template"),
    }))
}
