//! Time-bounded cache for the policy spec.
//!
//! A cached spec is never modified; a refresh swaps in a new `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, info};

use adlens_creative::PolicySpec;

use crate::upstream::{SpecSource, UpstreamError};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

type Entry = Option<(Arc<PolicySpec>, Instant)>;

pub struct SpecCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: RwLock<Entry>,
}

impl SpecCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached spec while it is younger than the TTL, otherwise a fresh one
    /// from `source`. A failed fetch leaves the previous entry untouched.
    pub async fn get(&self, source: &dyn SpecSource) -> Result<Arc<PolicySpec>, UpstreamError> {
        if let Some(spec) = self.fresh(&*self.entry.read().await) {
            debug!(version = %spec.version, "spec cache hit");
            return Ok(spec);
        }

        let mut guard = self.entry.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(spec) = self.fresh(&guard) {
            debug!(version = %spec.version, "spec cache hit");
            return Ok(spec);
        }

        debug!(source = source.name(), "spec cache miss");
        let spec = Arc::new(source.fetch_spec().await?);
        info!(version = %spec.version, source = source.name(), "policy spec refreshed");
        *guard = Some((Arc::clone(&spec), self.clock.now()));
        Ok(spec)
    }

    /// Current entry regardless of age, without fetching.
    pub async fn peek(&self) -> Option<Arc<PolicySpec>> {
        self.entry.read().await.as_ref().map(|(spec, _)| Arc::clone(spec))
    }

    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
        debug!("spec cache invalidated");
    }

    fn fresh(&self, entry: &Entry) -> Option<Arc<PolicySpec>> {
        let (spec, stored_at) = entry.as_ref()?;
        let age = self.clock.now().saturating_duration_since(*stored_at);
        (age < self.ttl).then(|| Arc::clone(spec))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;

    struct ManualClock(Mutex<Instant>);

    impl ManualClock {
        fn new() -> Self {
            Self(Mutex::new(Instant::now()))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.0.lock().unwrap()
        }
    }

    #[derive(Default)]
    struct CountingSource {
        fetches: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl SpecSource for CountingSource {
        async fn fetch_spec(&self) -> Result<PolicySpec, UpstreamError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(UpstreamError::Decode("boom".into()));
            }
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            let mut spec = PolicySpec::builtin(Utc::now());
            spec.version = format!("v{n}");
            Ok(spec)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn cache() -> (SpecCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = SpecCache::with_clock(Duration::from_secs(300), clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn serves_cached_spec_within_ttl() {
        let (cache, clock) = cache();
        let source = CountingSource::default();

        let first = cache.get(&source).await.unwrap();
        clock.advance(Duration::from_secs(299));
        let second = cache.get(&source).await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn refetches_after_ttl_without_touching_old_spec() {
        let (cache, clock) = cache();
        let source = CountingSource::default();

        let first = cache.get(&source).await.unwrap();
        clock.advance(Duration::from_secs(300));
        let second = cache.get(&source).await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(first.version, "v1");
        assert_eq!(second.version, "v2");
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let (cache, _clock) = cache();
        let source = CountingSource::default();

        cache.get(&source).await.unwrap();
        cache.invalidate().await;
        assert!(cache.peek().await.is_none());
        cache.get(&source).await.unwrap();

        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_entry() {
        let (cache, clock) = cache();
        let source = CountingSource::default();

        cache.get(&source).await.unwrap();
        clock.advance(Duration::from_secs(600));
        source.fail.store(true, Ordering::SeqCst);

        assert!(cache.get(&source).await.is_err());
        assert_eq!(cache.peek().await.map(|s| s.version.clone()), Some("v1".into()));
    }
}
