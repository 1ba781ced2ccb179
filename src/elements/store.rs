use std::fmt;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::elements::error::ElementsError;
use crate::elements::parsing::parse_feed;
use crate::elements::source::ElementSource;
use crate::elements::types::OrbitalElementRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Populated,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheState::Empty => write!(f, "empty"),
            CacheState::Populated => write!(f, "populated"),
        }
    }
}

/// Process-wide element cache. Populated by the first successful fetch and
/// never refreshed afterwards; a failed fetch leaves it empty so the next
/// caller tries again. Concurrent first callers share a single fetch.
pub struct ElementStore {
    source: Box<dyn ElementSource>,
    cache: OnceCell<Arc<[OrbitalElementRecord]>>,
}

impl ElementStore {
    pub fn new(source: Box<dyn ElementSource>) -> Self {
        Self {
            source,
            cache: OnceCell::new(),
        }
    }

    pub fn source_location(&self) -> &str {
        self.source.location()
    }

    pub fn state(&self) -> CacheState {
        if self.cache.initialized() {
            CacheState::Populated
        } else {
            CacheState::Empty
        }
    }

    /// Cached records, fetching them first if the cache is still empty
    pub async fn get_all(&self) -> Result<Arc<[OrbitalElementRecord]>, ElementsError> {
        self.cache
            .get_or_try_init(|| self.fetch())
            .await
            .map(Arc::clone)
    }

    async fn fetch(&self) -> Result<Arc<[OrbitalElementRecord]>, ElementsError> {
        let location = self.source.location();
        log::info!("Fetching orbital elements from {}", location);

        let body = self.source.fetch().await.map_err(|e| {
            log::warn!("Element source {} unavailable: {}", location, e);
            e
        })?;
        let records = parse_feed(&body, location)?;

        log::info!("Cached {} element records from {}", records.len(), location);
        Ok(records.into())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::elements::error::ElementsError;
    use crate::elements::source::{ElementSource, FetchFuture};

    /// In-memory source that counts fetches and can be told to fail.
    pub struct StaticSource {
        pub body: String,
        pub fail_first: usize,
        pub delay: Duration,
        pub fetches: Arc<AtomicUsize>,
    }

    impl StaticSource {
        pub fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                fail_first: 0,
                delay: Duration::ZERO,
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl ElementSource for StaticSource {
        fn location(&self) -> &str {
            "memory://stations"
        }

        fn fetch(&self) -> FetchFuture<'_> {
            Box::pin(async move {
                let attempt = self.fetches.fetch_add(1, Ordering::SeqCst);
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                if attempt < self.fail_first {
                    return Err(ElementsError::Status {
                        url: self.location().to_string(),
                        status: 503,
                    });
                }
                Ok(self.body.clone())
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use super::testing::StaticSource;
    use super::*;
    use crate::elements::parsing::fixtures::stations_feed;

    #[tokio::test]
    async fn caches_after_first_fetch() {
        let source = StaticSource::new(stations_feed());
        let fetches = source.fetches.clone();
        let store = ElementStore::new(Box::new(source));

        assert_eq!(store.state(), CacheState::Empty);
        let first = store.get_all().await.unwrap();
        let second = store.get_all().await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.state(), CacheState::Populated);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let mut source = StaticSource::new(stations_feed());
        source.fail_first = 1;
        let fetches = source.fetches.clone();
        let store = ElementStore::new(Box::new(source));

        assert!(matches!(
            store.get_all().await,
            Err(ElementsError::Status { status: 503, .. })
        ));
        assert_eq!(store.state(), CacheState::Empty);

        assert_eq!(store.get_all().await.unwrap().len(), 2);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_requests_share_one_fetch() {
        let mut source = StaticSource::new(stations_feed());
        source.delay = Duration::from_millis(50);
        let fetches = source.fetches.clone();
        let store = Arc::new(ElementStore::new(Box::new(source)));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.get_all().await.map(|r| r.len()) })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 2);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}
