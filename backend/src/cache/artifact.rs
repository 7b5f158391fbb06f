use chrono::{DateTime, Utc};
use futures::future::join_all;
use shared::api::CalendarStatus;
use shared::ics;
use shared::models::CalendarConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{CacheError, CacheResult, Clock, SourceCache};

/// A published calendar as last computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSnapshot {
    pub text: String,
    pub computed: DateTime<Utc>,
    /// Newest source timestamp that went into `text`.
    pub sources_as_of: DateTime<Utc>,
}

struct ArtifactEntry {
    config: CalendarConfig,
    /// Held for the whole duration of a recompute.
    gate: Mutex<()>,
    snapshot: RwLock<Option<Arc<ArtifactSnapshot>>>,
}

impl ArtifactEntry {
    fn new(config: CalendarConfig) -> Self {
        Self {
            config,
            gate: Mutex::new(()),
            snapshot: RwLock::new(None),
        }
    }

    async fn current(&self) -> Option<Arc<ArtifactSnapshot>> {
        self.snapshot.read().await.clone()
    }
}

/// Cache of filtered and merged calendars keyed by lower-cased name.
pub struct ArtifactCache {
    sources: Arc<SourceCache>,
    entries: RwLock<HashMap<String, Arc<ArtifactEntry>>>,
    clock: Arc<dyn Clock>,
}

impl ArtifactCache {
    pub fn new(sources: Arc<SourceCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sources,
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn sources(&self) -> &SourceCache {
        &self.sources
    }

    /// Create the entry for a calendar and register its sources.
    ///
    /// Registering a name that already exists (ignoring case) is a no-op.
    pub async fn register(&self, config: CalendarConfig) {
        let urls = config.private_urls.clone();

        {
            let mut entries = self.entries.write().await;
            let key = config.key();
            if entries.contains_key(&key) {
                tracing::warn!("Calendar {} is already registered", config.name);
                return;
            }
            tracing::debug!("Registering calendar {} with {} sources", config.name, urls.len());
            entries.insert(key, Arc::new(ArtifactEntry::new(config)));
        }

        for url in &urls {
            self.sources.ensure(url).await;
        }
    }

    /// Current document for `name`, computing it first if it never was.
    pub async fn get(&self, name: &str) -> CacheResult<Arc<ArtifactSnapshot>> {
        let entry = self
            .lookup(name)
            .await
            .ok_or_else(|| CacheError::UnknownCalendar(name.to_string()))?;

        if let Some(snapshot) = entry.current().await {
            return Ok(snapshot);
        }

        let _gate = entry.gate.lock().await;

        if let Some(snapshot) = entry.current().await {
            return Ok(snapshot);
        }

        self.compute(&entry).await
    }

    /// Refresh stale sources, then recompute every calendar that has a source
    /// newer than its last computation. Returns the number of calendars
    /// recomputed.
    pub async fn refresh_all(&self) -> usize {
        let sources_updated = self.sources.refresh_all().await;
        if sources_updated > 0 {
            tracing::debug!("{} sources updated", sources_updated);
        }

        let entries: Vec<Arc<ArtifactEntry>> = self.entries.read().await.values().cloned().collect();

        let results = join_all(entries.iter().map(|entry| self.refresh_entry(entry))).await;
        results.into_iter().filter(|updated| *updated).count()
    }

    /// Per-calendar freshness summary, sorted by name.
    pub async fn status(&self) -> Vec<CalendarStatus> {
        let entries: Vec<Arc<ArtifactEntry>> = self.entries.read().await.values().cloned().collect();
        let mut statuses = Vec::with_capacity(entries.len());

        for entry in entries {
            let mut sources_fetched = 0;
            for url in &entry.config.private_urls {
                if self.sources.last_updated(url).await.is_some() {
                    sources_fetched += 1;
                }
            }

            statuses.push(CalendarStatus {
                name: entry.config.name.clone(),
                last_computed: entry.current().await.map(|snapshot| snapshot.computed),
                sources: entry.config.private_urls.len(),
                sources_fetched,
            });
        }

        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    async fn lookup(&self, name: &str) -> Option<Arc<ArtifactEntry>> {
        self.entries.read().await.get(&name.to_lowercase()).cloned()
    }

    async fn refresh_entry(&self, entry: &ArtifactEntry) -> bool {
        let _gate = entry.gate.lock().await;

        if !self.requires_update(entry).await {
            return false;
        }

        match self.compute(entry).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Calendar {} not updated: {}", entry.config.name, e);
                false
            }
        }
    }

    async fn requires_update(&self, entry: &ArtifactEntry) -> bool {
        let as_of = entry.current().await.map(|snapshot| snapshot.sources_as_of);

        for url in &entry.config.private_urls {
            let updated = self.sources.last_updated(url).await;
            if updated > as_of {
                tracing::info!("Calendar {} requires update", entry.config.name);
                return true;
            }
        }

        false
    }

    /// Filter and merge the current sources. Callers must hold the entry's gate.
    async fn compute(&self, entry: &ArtifactEntry) -> CacheResult<Arc<ArtifactSnapshot>> {
        let config = &entry.config;
        let mut filtered = Vec::with_capacity(config.private_urls.len());
        let mut sources_as_of: Option<DateTime<Utc>> = None;

        for url in &config.private_urls {
            match self.sources.get(url).await {
                Ok(source) => {
                    sources_as_of = sources_as_of.max(Some(source.updated));
                    filtered.push(ics::filter(&source.text, &config.name));
                }
                Err(e) => {
                    tracing::warn!("Skipping source of calendar {}: {}", config.name, e);
                }
            }
        }

        let Some(sources_as_of) = sources_as_of else {
            return Err(CacheError::NoSourceAvailable(config.name.clone()));
        };

        let snapshot = Arc::new(ArtifactSnapshot {
            text: ics::merge(&filtered),
            computed: self.clock.now().max(sources_as_of),
            sources_as_of,
        });
        *entry.snapshot.write().await = Some(snapshot.clone());

        tracing::info!("Calendar {} updated", config.name);
        Ok(snapshot)
    }
}
