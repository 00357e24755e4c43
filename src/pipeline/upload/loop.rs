use anyhow::{Context, Result};
use bytes::Bytes;
use sqlx::PgPool;

use crate::platform::ArtifactStore;
use crate::telemetry::{self};
use crate::telemetry::ops::upload::Phase as UploadPhase;

use super::db::{self, UploadShardRow};

fn object_key(shard: &UploadShardRow) -> String {
    format!(
        "datasets/{}/{}/shard-{:05}.jsonl",
        shard.hub_id, shard.split, shard.shard_index
    )
}

async fn put_one(pool: &PgPool, store: &ArtifactStore, shard: &UploadShardRow) -> Result<String> {
    let log = telemetry::upload();

    let _rs = log.span_kv(&UploadPhase::ReadShard, [("path", shard.path.clone())]).entered();
    let body = tokio::fs::read(&shard.path)
        .await
        .with_context(|| format!("read shard {}", shard.path))?;
    drop(_rs);

    let key = object_key(shard);
    let _po = log.span_kv(&UploadPhase::PutObject, [("key", key.clone())]).entered();
    let uri = store
        .put_object(&key, Bytes::from(body))
        .await
        .with_context(|| format!("upload shard_id={}", shard.shard_id))?;
    drop(_po);

    let _mu = log.span(&UploadPhase::MarkUploaded).entered();
    db::mark_uploaded(pool, shard.shard_id, &uri).await?;
    Ok(uri)
}

pub async fn upload_force_once(
    pool: &PgPool,
    store: &ArtifactStore,
    dataset: Option<i32>,
    max: Option<i64>,
) -> Result<i64> {
    let log = telemetry::upload();
    let rows = { let _fb = log.span(&UploadPhase::FetchBatch).entered(); db::fetch_all(pool, dataset, max).await? };
    if rows.is_empty() { return Ok(0); }

    let mut total = 0i64;
    for shard in &rows {
        put_one(pool, store, shard).await?;
        total += 1;
        log.info(format!("☁️  uploaded shard-{:05} (total={})", shard.shard_index, total));
    }
    Ok(total)
}

pub async fn upload_missing_paged(
    pool: &PgPool,
    store: &ArtifactStore,
    dataset: Option<i32>,
    batch: usize,
    max: Option<i64>,
) -> Result<i64> {
    let log = telemetry::upload();
    let mut total = 0i64;
    let mut remaining = max.unwrap_or(i64::MAX);
    loop {
        let n = remaining.min(batch as i64);
        if n <= 0 { break; }

        let rows = { let _fb = log.span(&UploadPhase::FetchBatch).entered(); db::fetch_missing(pool, dataset, n).await? };
        if rows.is_empty() { break; }

        for shard in &rows {
            put_one(pool, store, shard).await?;
            total += 1;
            log.info(format!("☁️  uploaded shard-{:05} (total={})", shard.shard_index, total));
        }
        remaining -= rows.len() as i64;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_is_zero_padded_under_dataset_prefix() {
        let shard = UploadShardRow {
            shard_id: 9,
            shard_index: 7,
            path: "data/packed/dataset-1/shard-00007.jsonl".into(),
            hub_id: "samsum".into(),
            split: "train".into(),
        };
        assert_eq!(object_key(&shard), "datasets/samsum/train/shard-00007.jsonl");
    }
}
