use anyhow::Result;
use sqlx::PgPool;

const TABLES: [&str; 5] = ["tune.dataset", "tune.example", "tune.shard", "tune.job", "tune.endpoint"];

pub async fn analyze_tables(pool: &PgPool) -> Result<()> {
    for table in TABLES {
        sqlx::query(&format!("ANALYZE {}", table)).execute(pool).await?;
    }
    Ok(())
}

pub async fn vacuum_full(pool: &PgPool) -> Result<()> {
    for table in TABLES {
        sqlx::query(&format!("VACUUM (ANALYZE, FULL) {}", table)).execute(pool).await?;
    }
    Ok(())
}
