//! TTL cache in front of a movie provider.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::debug;

use super::{CatalogResult, Movie, MovieProvider};

#[derive(Default)]
struct CacheSlot {
    movies: Option<Arc<Vec<Movie>>>,
    fetched_at: Option<Instant>,
}

impl CacheSlot {
    fn fresh(&self, ttl: Duration) -> Option<Arc<Vec<Movie>>> {
        let fetched_at = self.fetched_at?;
        if fetched_at.elapsed() < ttl {
            self.movies.clone()
        } else {
            None
        }
    }
}

/// Decorator that memoises any [`MovieProvider`] for a fixed time-to-live.
///
/// The cache mutex is held across the upstream call, so concurrent readers of a stale
/// cache wait for a single refetch instead of stampeding the source. Failed fetches
/// are not cached.
#[derive(Clone)]
pub struct CachingMovieProvider {
    inner: Arc<dyn MovieProvider>,
    slot: Arc<Mutex<CacheSlot>>,
    ttl: Duration,
}

impl CachingMovieProvider {
    /// Cache `inner` for `ttl`.
    pub fn new(inner: Arc<dyn MovieProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            slot: Arc::new(Mutex::new(CacheSlot::default())),
            ttl,
        }
    }
}

impl MovieProvider for CachingMovieProvider {
    fn fetch_movies(&self) -> BoxFuture<'static, CatalogResult<Vec<Movie>>> {
        let inner = self.inner.clone();
        let slot = self.slot.clone();
        let ttl = self.ttl;

        Box::pin(async move {
            let mut guard = slot.lock().await;
            if let Some(movies) = guard.fresh(ttl) {
                return Ok(movies.as_ref().clone());
            }

            let movies = inner.fetch_movies().await?;
            debug!(count = movies.len(), "refreshed movie catalog cache");
            guard.movies = Some(Arc::new(movies.clone()));
            guard.fetched_at = Some(Instant::now());
            Ok(movies)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::catalog::{CatalogError, dummy::DummyMovieProvider};

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl MovieProvider for CountingProvider {
        fn fetch_movies(&self) -> BoxFuture<'static, CatalogResult<Vec<Movie>>> {
            let calls = self.calls.clone();
            let fail = self.fail;
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(CatalogError::SourceUnavailable {
                        message: "offline".into(),
                    })
                } else {
                    DummyMovieProvider.fetch_movies().await
                }
            })
        }
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachingMovieProvider::new(
            Arc::new(CountingProvider {
                calls: calls.clone(),
                fail: false,
            }),
            Duration::from_secs(60),
        );

        let first = provider.fetch_movies().await.unwrap();
        let second = provider.fetch_movies().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_stale_reads_trigger_a_single_refetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachingMovieProvider::new(
            Arc::new(CountingProvider {
                calls: calls.clone(),
                fail: false,
            }),
            Duration::from_secs(60),
        );

        let handles = (0..8)
            .map(|_| {
                let provider = provider.clone();
                tokio::spawn(async move { provider.fetch_movies().await })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_cache_refetches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachingMovieProvider::new(
            Arc::new(CountingProvider {
                calls: calls.clone(),
                fail: false,
            }),
            Duration::ZERO,
        );

        provider.fetch_movies().await.unwrap();
        provider.fetch_movies().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachingMovieProvider::new(
            Arc::new(CountingProvider {
                calls: calls.clone(),
                fail: true,
            }),
            Duration::from_secs(60),
        );

        assert!(provider.fetch_movies().await.is_err());
        assert!(provider.fetch_movies().await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
