//! Finished videos, keyed by request id, with expiry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct StoredResult {
    pub id: Uuid,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

pub struct ResultStore {
    dir: PathBuf,
    ttl: chrono::Duration,
    entries: Mutex<HashMap<Uuid, StoredResult>>,
}

impl ResultStore {
    pub async fn new<P: AsRef<Path>>(dir: P, ttl: Duration) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;

        Ok(Self {
            dir,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Durable location for the result of request `id`
    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.mp4", id))
    }

    pub async fn insert(&self, id: Uuid, path: PathBuf) -> StoredResult {
        let result = StoredResult { id, path, created_at: Utc::now() };
        self.entries.lock().await.insert(id, result.clone());
        result
    }

    /// Look up a result that has not expired yet
    pub async fn get(&self, id: Uuid) -> Option<StoredResult> {
        let entries = self.entries.lock().await;
        entries
            .get(&id)
            .filter(|r| !self.is_expired(r, Utc::now()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    fn is_expired(&self, result: &StoredResult, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(result.created_at) >= self.ttl
    }

    /// Drop expired entries and delete their files
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<StoredResult> = {
            let mut entries = self.entries.lock().await;
            let ids: Vec<Uuid> = entries
                .values()
                .filter(|r| self.is_expired(r, now))
                .map(|r| r.id)
                .collect();
            ids.iter().filter_map(|id| entries.remove(id)).collect()
        };

        for result in &expired {
            if let Err(e) = tokio::fs::remove_file(&result.path).await {
                warn!("Failed to remove expired result {}: {}", result.path.display(), e);
            }
        }

        if !expired.is_empty() {
            info!("Purged {} expired result(s)", expired.len());
        }
        expired.len()
    }
}

/// Periodically purge expired results
pub fn start_cleanup_task(store: Arc<ResultStore>, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let purged = store.purge_expired().await;
            debug!(purged, "Result cleanup pass");
        }
    })
}
