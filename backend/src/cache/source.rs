use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use super::{CacheError, CacheResult, Clock};
use crate::fetch::Fetcher;

/// Raw feed text together with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnapshot {
    pub text: String,
    pub updated: DateTime<Utc>,
}

struct SourceEntry {
    url: String,
    /// Held for the whole duration of a fetch.
    gate: Mutex<()>,
    snapshot: RwLock<Option<Arc<SourceSnapshot>>>,
}

impl SourceEntry {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            gate: Mutex::new(()),
            snapshot: RwLock::new(None),
        }
    }

    async fn current(&self) -> Option<Arc<SourceSnapshot>> {
        self.snapshot.read().await.clone()
    }
}

/// Cache of raw source feeds keyed by URL.
pub struct SourceCache {
    entries: RwLock<HashMap<String, Arc<SourceEntry>>>,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SourceCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(3 * 60);

    pub fn new(fetcher: Arc<dyn Fetcher>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            fetcher,
            clock,
            ttl,
        }
    }

    /// Register a URL without fetching it.
    pub async fn ensure(&self, url: &str) {
        self.entry(url).await;
    }

    /// Number of registered URLs.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Current text of `url`, fetching it first if it has never been fetched.
    pub async fn get(&self, url: &str) -> CacheResult<Arc<SourceSnapshot>> {
        let entry = self.entry(url).await;

        if let Some(snapshot) = entry.current().await {
            return Ok(snapshot);
        }

        let _gate = entry.gate.lock().await;

        // Someone else may have fetched it while we waited.
        if let Some(snapshot) = entry.current().await {
            return Ok(snapshot);
        }

        self.update(&entry).await
    }

    /// Time of the last successful fetch, `None` if there never was one.
    pub async fn last_updated(&self, url: &str) -> Option<DateTime<Utc>> {
        let entry = self.entries.read().await.get(url).cloned()?;
        let snapshot = entry.current().await?;
        Some(snapshot.updated)
    }

    /// Refetch every source that is unfetched or older than the TTL.
    ///
    /// Sources are refreshed concurrently. A failed fetch is logged and the
    /// previous text stays in place. Returns the number of sources updated.
    pub async fn refresh_all(&self) -> usize {
        let entries: Vec<Arc<SourceEntry>> = self.entries.read().await.values().cloned().collect();

        let results = join_all(entries.iter().map(|entry| self.refresh_entry(entry))).await;
        results.into_iter().filter(|updated| *updated).count()
    }

    async fn refresh_entry(&self, entry: &SourceEntry) -> bool {
        let _gate = entry.gate.lock().await;

        if !self.is_stale(entry.current().await.as_deref()) {
            return false;
        }

        match self.update(entry).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Source refresh failed, keeping previous data: {}", e);
                false
            }
        }
    }

    fn is_stale(&self, snapshot: Option<&SourceSnapshot>) -> bool {
        let Some(snapshot) = snapshot else {
            return true;
        };

        // A timestamp in the future (clock skew) counts as fresh.
        match (self.clock.now() - snapshot.updated).to_std() {
            Ok(age) => age > self.ttl,
            Err(_) => false,
        }
    }

    async fn entry(&self, url: &str) -> Arc<SourceEntry> {
        if let Some(entry) = self.entries.read().await.get(url) {
            return entry.clone();
        }

        let mut entries = self.entries.write().await;
        entries
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(SourceEntry::new(url)))
            .clone()
    }

    /// Fetch and swap in a new snapshot. Callers must hold the entry's gate.
    async fn update(&self, entry: &SourceEntry) -> CacheResult<Arc<SourceSnapshot>> {
        let text = self
            .fetcher
            .fetch(&entry.url)
            .await
            .map_err(|source| CacheError::Fetch {
                url: entry.url.clone(),
                source,
            })?;

        let snapshot = Arc::new(SourceSnapshot {
            text,
            updated: self.clock.now(),
        });
        *entry.snapshot.write().await = Some(snapshot.clone());

        tracing::debug!("Data from {} updated", entry.url);
        Ok(snapshot)
    }
}
