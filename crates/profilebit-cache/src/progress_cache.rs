use crate::cache::{cache_key, CacheEntry, CacheStats, StatsRecorder};
use crate::invalidation::InvalidationScope;
use profilebit_core::{
    compute_progress, format_progress, CacheConfig, FormattedProgress, KeyValueStore,
    ProfileDataSource, ProfileLinks, Result, Selection, UserId,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-through cache of formatted progress, one entry per user.
///
/// Entries never expire on their own; they live until an invalidation removes
/// them or the next computation overwrites them. The store is treated as
/// optional: read failures fall back to direct computation and write failures
/// only cost the next request a recompute.
pub struct ProgressCache {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    enabled: bool,
    stats: StatsRecorder,
}

impl ProgressCache {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            enabled: true,
            stats: StatsRecorder::default(),
        }
    }

    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &CacheConfig) -> Self {
        let mut cache = Self::new(store, config.namespace.clone());
        cache.enabled = config.enabled;
        cache
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn key_for(&self, user_id: UserId) -> String {
        cache_key(&self.namespace, user_id)
    }

    /// Progress for `viewer`, served from the store when an entry exists.
    ///
    /// Returns `None` when there is nothing to render (no viewer or an empty
    /// selection); the store is not consulted in that case.
    pub fn get_formatted_progress(
        &self,
        source: &dyn ProfileDataSource,
        selection: &Selection,
        viewer: Option<UserId>,
    ) -> Option<FormattedProgress> {
        let user_id = viewer?;
        if selection.is_empty() {
            return None;
        }

        let key = self.key_for(user_id);
        if self.enabled {
            if let Some(cached) = self.lookup(&key) {
                return Some(cached);
            }
        }

        let snapshot = compute_progress(source, selection, Some(user_id))?;
        let formatted = format_progress(&snapshot, &ProfileLinks::for_user(source, user_id));

        if self.enabled {
            self.write(&key, &formatted);
        }
        Some(formatted)
    }

    fn lookup(&self, key: &str) -> Option<FormattedProgress> {
        match self.store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => {
                    self.stats.hit();
                    debug!(key, stored_at = %entry.stored_at, "Progress cache hit");
                    Some(entry.value)
                }
                Err(e) => {
                    self.stats.miss();
                    warn!(key, "Discarding undecodable progress entry: {}", e);
                    None
                }
            },
            Ok(None) => {
                self.stats.miss();
                debug!(key, "Progress cache miss");
                None
            }
            Err(e) => {
                self.stats.store_error();
                self.stats.miss();
                warn!(key, "Progress store read failed, computing directly: {}", e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &FormattedProgress) {
        let serialized = match serde_json::to_string(&CacheEntry::new(value.clone())) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!(key, "Failed to serialize progress entry: {}", e);
                return;
            }
        };
        match self.store.set(key, serialized) {
            Ok(()) => self.stats.write(),
            Err(e) => {
                self.stats.store_error();
                warn!(key, "Progress store write failed: {}", e);
            }
        }
    }

    /// Drop every entry belonging to `user_id`.
    ///
    /// This is a prefix delete on `"<namespace><user_id>"`, so it may also
    /// remove entries of users whose id starts with the same digits. Those
    /// users simply recompute on their next request.
    pub fn invalidate_for_user(&self, user_id: UserId) -> Result<usize> {
        let removed = self.store.delete_by_prefix(&self.key_for(user_id))?;
        self.stats.invalidation();
        debug!(user_id, removed, "Invalidated user progress");
        Ok(removed)
    }

    /// Drop every entry in the namespace.
    pub fn invalidate_all(&self) -> Result<usize> {
        let removed = self.store.delete_by_prefix(&self.namespace)?;
        self.stats.invalidation();
        info!(removed, namespace = %self.namespace, "Invalidated all progress entries");
        Ok(removed)
    }

    pub fn invalidate(&self, scope: InvalidationScope) -> Result<usize> {
        match scope {
            InvalidationScope::User(user_id) => self.invalidate_for_user(user_id),
            InvalidationScope::All => self.invalidate_all(),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
