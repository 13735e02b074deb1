use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;

use super::QueryKey;
use crate::types::Config;

const EVENT_CAPACITY: usize = 64;

/// Freshness and retention windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Data younger than this is served without a request.
    pub stale_time: Duration,
    /// Entries not read for this long are evicted by `collect_garbage`.
    pub cache_time: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            cache_time: Duration::from_secs(30 * 60),
        }
    }
}

impl From<&Config> for CachePolicy {
    fn from(config: &Config) -> Self {
        Self {
            stale_time: Duration::from_secs(config.stale_time_secs),
            cache_time: Duration::from_secs(config.cache_time_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Updated(QueryKey),
    Invalidated(QueryKey),
    Cleared,
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
    last_access: Instant,
    invalidated: bool,
}

/// Shared store of fetched collections keyed by resource + params.
///
/// Values are type-erased; a key must always be read with the type it was
/// written with, otherwise the read misses and the fetcher runs again.
pub struct QueryCache {
    policy: CachePolicy,
    entries: DashMap<QueryKey, CacheEntry>,
    in_flight: DashMap<QueryKey, Arc<Mutex<()>>>,
    /// Bumped by `invalidate` and `clear`.
    generation: AtomicU64,
    /// Bumped by `clear` only.
    epoch: AtomicU64,
    events: broadcast::Sender<CacheEvent>,
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            policy,
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            generation: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            events,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return fresh cached data for `key`, or run `fetcher` and store its result.
    ///
    /// Concurrent calls for the same key share one request. A failed fetch
    /// leaves any previous entry in place and returns the error. A result
    /// that raced an invalidation is stored already stale; one that raced a
    /// `clear` is returned but not stored.
    pub async fn fetch<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh::<T>(key) {
            log::debug!("query cache hit: {key}");
            return Ok(value);
        }

        let lock = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let result = {
            let _guard = lock.lock().await;
            self.fetch_locked(key, fetcher).await
        };
        self.release(key, &lock);
        result
    }

    async fn fetch_locked<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Another caller may have filled the entry while we waited.
        if let Some(value) = self.fresh::<T>(key) {
            log::debug!("query cache hit after wait: {key}");
            return Ok(value);
        }

        log::debug!("query cache miss: {key}");
        let generation = self.generation.load(Ordering::SeqCst);
        let epoch = self.epoch.load(Ordering::SeqCst);
        let value = Arc::new(fetcher().await?);

        if self.epoch.load(Ordering::SeqCst) != epoch {
            log::debug!("cache cleared during fetch, not storing {key}");
            return Ok(value);
        }
        let raced = self.generation.load(Ordering::SeqCst) != generation;
        let now = Instant::now();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                value: value.clone(),
                fetched_at: now,
                last_access: now,
                invalidated: raced,
            },
        );
        let _ = self.events.send(CacheEvent::Updated(key.clone()));
        Ok(value)
    }

    /// Drop the per-key lock once no other caller holds or waits on it.
    fn release(&self, key: &QueryKey, lock: &Arc<Mutex<()>>) {
        self.in_flight
            .remove_if(key, |_, held| Arc::ptr_eq(held, lock) && Arc::strong_count(held) == 2);
    }

    fn fresh<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let mut entry = self.entries.get_mut(key)?;
        if entry.invalidated || entry.fetched_at.elapsed() >= self.policy.stale_time {
            return None;
        }
        entry.last_access = Instant::now();
        entry.value.clone().downcast::<T>().ok()
    }

    /// Cached data regardless of freshness.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let mut entry = self.entries.get_mut(key)?;
        entry.last_access = Instant::now();
        entry.value.clone().downcast::<T>().ok()
    }

    /// True when the next `fetch` for `key` would issue a request.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        match self.entries.get(key) {
            Some(entry) => entry.invalidated || entry.fetched_at.elapsed() >= self.policy.stale_time,
            None => true,
        }
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().starts_with(prefix) {
                entry.invalidated = true;
                count += 1;
            }
        }
        log::debug!("invalidated {count} cache entries under {prefix}");
        let _ = self.events.send(CacheEvent::Invalidated(prefix.clone()));
        count
    }

    /// Drop everything, e.g. on logout.
    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
        self.in_flight.clear();
        let _ = self.events.send(CacheEvent::Cleared);
    }

    /// Evict entries not read within the retention window.
    pub fn collect_garbage(&self) -> usize {
        let before = self.entries.len();
        let cache_time = self.policy.cache_time;
        self.entries
            .retain(|_, entry| entry.last_access.elapsed() < cache_time);
        self.in_flight.retain(|_, lock| Arc::strong_count(lock) > 1);
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            log::debug!("query cache evicted {evicted} idle entries");
        }
        evicted
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys with a fetch lock currently allocated.
    pub fn pending_locks(&self) -> usize {
        self.in_flight.len()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(calls: &AtomicUsize, value: Vec<u32>) -> Result<Vec<u32>, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_reads_skip_fetch() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let key = QueryKey::resource("tickets");

        let first = cache.fetch(&key, || counted(&calls, vec![1, 2])).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        let second = cache.fetch(&key, || counted(&calls, vec![9])).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*first, *second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_after_window() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let key = QueryKey::resource("agents");

        cache.fetch(&key, || counted(&calls, vec![1])).await.unwrap();
        tokio::time::advance(Duration::from_secs(5 * 60 + 1)).await;
        assert!(cache.is_stale(&key));
        let value = cache.fetch(&key, || counted(&calls, vec![2])).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*value, vec![2]);
    }

    #[tokio::test]
    async fn test_invalidate_by_prefix() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let page_one = QueryKey::resource("calls").with(1).with("inbound");
        let page_two = QueryKey::resource("calls").with(2).with("inbound");
        let users = QueryKey::resource("users");

        cache.fetch(&page_one, || counted(&calls, vec![1])).await.unwrap();
        cache.fetch(&page_two, || counted(&calls, vec![2])).await.unwrap();
        cache.fetch(&users, || counted(&calls, vec![3])).await.unwrap();

        assert_eq!(cache.invalidate(&QueryKey::resource("calls")), 2);
        assert!(cache.is_stale(&page_one));
        assert!(cache.is_stale(&page_two));
        assert!(!cache.is_stale(&users));

        // Stale data stays readable until refetched.
        assert_eq!(*cache.peek::<Vec<u32>>(&page_one).unwrap(), vec![1]);

        cache.fetch(&page_one, || counted(&calls, vec![10])).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_share_one_request() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        let key = QueryKey::resource("tickets");

        let calls = &calls;
        let slow = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, String>(vec![7u32])
        };

        let (a, b) = tokio::join!(cache.fetch(&key, slow), cache.fetch(&key, slow));
        assert_eq!(*a.unwrap(), vec![7]);
        assert_eq!(*b.unwrap(), vec![7]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_entry() {
        let cache = QueryCache::default();
        let key = QueryKey::resource("users");
        cache
            .fetch(&key, || async { Ok::<_, String>(vec![1u32]) })
            .await
            .unwrap();
        cache.invalidate(&key);

        let err = cache
            .fetch::<Vec<u32>, _, _, _>(&key, || async { Err("boom".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert_eq!(*cache.peek::<Vec<u32>>(&key).unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_clear_drops_everything_and_notifies() {
        let cache = QueryCache::default();
        let mut events = cache.subscribe();
        let key = QueryKey::resource("dashboard");
        cache
            .fetch(&key, || async { Ok::<_, String>(1u32) })
            .await
            .unwrap();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Updated(key));
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Cleared);
    }

    #[tokio::test(start_paused = true)]
    async fn test_garbage_collection_evicts_idle_entries() {
        let cache = QueryCache::default();
        let idle = QueryKey::resource("users");
        let active = QueryKey::resource("agents");
        cache.fetch(&idle, || async { Ok::<_, String>(1u32) }).await.unwrap();
        cache.fetch(&active, || async { Ok::<_, String>(2u32) }).await.unwrap();

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        cache.peek::<u32>(&active);
        tokio::time::advance(Duration::from_secs(11 * 60)).await;

        assert_eq!(cache.collect_garbage(), 1);
        assert!(cache.peek::<u32>(&idle).is_none());
        assert_eq!(*cache.peek::<u32>(&active).unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_during_fetch_stores_stale() {
        let cache = QueryCache::default();
        let key = QueryKey::resource("tickets");
        let slow = || async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, String>(vec![1u32])
        };
        let invalidate = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cache.invalidate(&key);
        };

        let (fetched, _) = tokio::join!(cache.fetch(&key, slow), invalidate);
        assert_eq!(*fetched.unwrap(), vec![1]);
        assert!(cache.is_stale(&key));
        assert_eq!(*cache.peek::<Vec<u32>>(&key).unwrap(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_during_fetch_discards_result() {
        let cache = QueryCache::default();
        let key = QueryKey::resource("tickets");
        let slow = || async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, String>(vec![1u32])
        };
        let logout = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cache.clear();
        };

        let (fetched, _) = tokio::join!(cache.fetch(&key, slow), logout);
        assert_eq!(*fetched.unwrap(), vec![1]);
        assert!(cache.is_empty());
        assert!(cache.is_stale(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_locks_are_released() {
        let cache = QueryCache::default();
        let calls = AtomicUsize::new(0);
        for page in 1..=5u32 {
            let key = QueryKey::resource("calls").with(page);
            cache.fetch(&key, || counted(&calls, vec![page])).await.unwrap();
        }
        assert_eq!(cache.pending_locks(), 0);

        let key = QueryKey::resource("agents");
        let slow = || async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, String>(vec![1u32])
        };
        let (a, b) = tokio::join!(cache.fetch(&key, slow), cache.fetch(&key, slow));
        assert!(a.is_ok() && b.is_ok());
        let failed = cache
            .fetch::<Vec<u32>, _, _, _>(&QueryKey::resource("users"), || async {
                Err("boom".to_string())
            })
            .await;
        assert!(failed.is_err());

        cache.collect_garbage();
        assert_eq!(cache.pending_locks(), 0);
    }
}
