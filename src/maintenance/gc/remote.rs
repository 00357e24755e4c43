use anyhow::Result;

use crate::platform::{Backend, PlatformError};
use crate::telemetry::{self};

/// Tear down live endpoints on the platform. Returns the names that were
/// actually deleted; a failed delete is logged and skipped so the rest of
/// the sweep continues.
pub async fn delete_endpoints(backend: &dyn Backend, names: &[String]) -> Result<Vec<String>> {
    let log = telemetry::gc();
    let mut deleted = Vec::new();
    for name in names {
        match backend.delete_endpoint(name).await {
            Ok(()) => {
                log.info(format!("🗑️  Deleted endpoint {}", name));
                deleted.push(name.clone());
            }
            Err(e) => log.warn(format!("⚠️  Delete endpoint {} failed: {}", name, e)),
        }
    }
    Ok(deleted)
}

/// Stop jobs stuck in a non-terminal state. A job the platform no longer
/// knows about counts as stopped.
pub async fn stop_jobs(backend: &dyn Backend, names: &[String]) -> Result<Vec<String>> {
    let log = telemetry::gc();
    let mut stopped = Vec::new();
    for name in names {
        match backend.stop_training_job(name).await {
            Ok(()) => {
                log.info(format!("🛑 Stopped job {}", name));
                stopped.push(name.clone());
            }
            Err(PlatformError::Api { status, .. }) if status.as_u16() == 404 => {
                log.warn(format!("⚠️  Job {} unknown to the platform; marking stopped", name));
                stopped.push(name.clone());
            }
            Err(e) => log.warn(format!("⚠️  Stop job {} failed: {}", name, e)),
        }
    }
    Ok(stopped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::api::MockBackend;

    #[tokio::test]
    async fn deletes_every_listed_endpoint() {
        let mock = MockBackend::new();
        let names = vec!["ep-a".to_string(), "ep-b".to_string()];
        let deleted = delete_endpoints(&mock, &names).await.unwrap();
        assert_eq!(deleted, names);
        assert_eq!(
            mock.calls(),
            vec!["delete_endpoint:ep-a".to_string(), "delete_endpoint:ep-b".to_string()]
        );
    }

    #[tokio::test]
    async fn stops_every_listed_job() {
        let mock = MockBackend::new();
        let names = vec!["job-a".to_string()];
        let stopped = stop_jobs(&mock, &names).await.unwrap();
        assert_eq!(stopped, names);
        assert_eq!(mock.calls(), vec!["stop_training_job:job-a".to_string()]);
    }
}
