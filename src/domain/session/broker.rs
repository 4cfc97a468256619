use async_trait::async_trait;

use super::ports::{SessionError, SessionLock, SessionSource, SessionToken, TokenCache};

/// Cache key under which the current bureau session token is stored.
pub const SESSION_CACHE_KEY: &str = "ubch.session";
/// Lock key serialising login calls across all instances.
pub const SESSION_LOCK_KEY: &str = "ubch.session.refresh";

/// Serves the current bureau session token to concurrent callers.
#[async_trait]
pub trait SessionProvider: Send + Sync + 'static {
    /// Returns a session token, logging in if none is cached.
    ///
    /// `force_refresh` discards whatever is cached and performs a fresh login;
    /// callers use it after the bureau has rejected the cached token.
    async fn session(&self, force_refresh: bool) -> Result<SessionToken, SessionError>;
}

/// Get-or-refresh protocol over a shared token cache and lock.
///
/// Steady-state calls are served straight from the cache. A miss (or a forced
/// refresh) takes the lock, re-reads the cache and only then logs in, so any
/// number of concurrent callers produce a single login call.
#[derive(Debug)]
pub struct SessionBroker<C, L, S>
where
    C: TokenCache,
    L: SessionLock,
    S: SessionSource,
{
    cache: C,
    lock: L,
    source: S,
}

impl<C, L, S> SessionBroker<C, L, S>
where
    C: TokenCache,
    L: SessionLock,
    S: SessionSource,
{
    pub fn new(cache: C, lock: L, source: S) -> Self {
        Self {
            cache,
            lock,
            source,
        }
    }
}

#[async_trait]
impl<C, L, S> SessionProvider for SessionBroker<C, L, S>
where
    C: TokenCache,
    L: SessionLock,
    S: SessionSource,
{
    #[tracing::instrument(name = "Acquiring bureau session", skip(self))]
    async fn session(&self, force_refresh: bool) -> Result<SessionToken, SessionError> {
        if !force_refresh {
            if let Some(cached) = self.cache.get(SESSION_CACHE_KEY).await? {
                return Ok(SessionToken::new(cached));
            }
        }

        let _guard = self.lock.acquire(SESSION_LOCK_KEY).await?;

        if !force_refresh {
            // Another holder may have refreshed the session while we waited.
            if let Some(cached) = self.cache.get(SESSION_CACHE_KEY).await? {
                return Ok(SessionToken::new(cached));
            }
        }

        let token = self.source.login().await?;
        self.cache.set(SESSION_CACHE_KEY, token.expose()).await?;
        tracing::info!("Refreshed bureau session");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::ports::{
        LoginError, SessionLockError, TokenCacheError,
    };
    use claims::{assert_err, assert_ok};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct StubCache {
        value: Mutex<Option<String>>,
        gets: AtomicUsize,
        sets: AtomicUsize,
    }

    impl StubCache {
        async fn seed(&self, value: &str) {
            *self.value.lock().await = Some(value.to_string());
        }
    }

    #[async_trait]
    impl TokenCache for Arc<StubCache> {
        async fn get(&self, _key: &str) -> Result<Option<String>, TokenCacheError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.lock().await.clone())
        }

        async fn set(&self, _key: &str, value: &str) -> Result<(), TokenCacheError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            *self.value.lock().await = Some(value.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubLock {
        inner: Arc<Mutex<()>>,
        acquisitions: AtomicUsize,
    }

    #[async_trait]
    impl SessionLock for Arc<StubLock> {
        type Guard = tokio::sync::OwnedMutexGuard<()>;

        async fn acquire(&self, _key: &str) -> Result<Self::Guard, SessionLockError> {
            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            Ok(self.inner.clone().lock_owned().await)
        }
    }

    struct StubSource {
        logins: AtomicUsize,
        failures_before_success: usize,
    }

    impl StubSource {
        fn new() -> Self {
            Self {
                logins: AtomicUsize::new(0),
                failures_before_success: 0,
            }
        }

        fn failing_once() -> Self {
            Self {
                logins: AtomicUsize::new(0),
                failures_before_success: 1,
            }
        }
    }

    #[async_trait]
    impl SessionSource for Arc<StubSource> {
        async fn login(&self) -> Result<SessionToken, LoginError> {
            let attempt = self.logins.fetch_add(1, Ordering::SeqCst);
            // Widen the race window so contending callers pile up on the lock.
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if attempt < self.failures_before_success {
                return Err(LoginError {
                    diagnostics: "credentials rejected".into(),
                });
            }
            Ok(SessionToken::new(format!("sessid-{}", attempt)))
        }
    }

    fn broker(
        cache: &Arc<StubCache>,
        lock: &Arc<StubLock>,
        source: &Arc<StubSource>,
    ) -> SessionBroker<Arc<StubCache>, Arc<StubLock>, Arc<StubSource>> {
        SessionBroker::new(cache.clone(), lock.clone(), source.clone())
    }

    #[tokio::test]
    async fn populated_cache_is_served_without_touching_the_lock() {
        let cache = Arc::new(StubCache::default());
        let lock = Arc::new(StubLock::default());
        let source = Arc::new(StubSource::new());
        cache.seed("sessid-cached").await;

        let token = broker(&cache, &lock, &source).session(false).await;

        assert_eq!(assert_ok!(token).expose(), "sessid-cached");
        assert_eq!(lock.acquisitions.load(Ordering::SeqCst), 0);
        assert_eq!(source.logins.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_callers_against_an_empty_cache_share_one_login() {
        let cache = Arc::new(StubCache::default());
        let lock = Arc::new(StubLock::default());
        let source = Arc::new(StubSource::new());
        let broker = Arc::new(broker(&cache, &lock, &source));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let broker = broker.clone();
                tokio::spawn(async move { broker.session(false).await })
            })
            .collect();
        let tokens = futures::future::join_all(handles).await;

        for token in tokens {
            let token = assert_ok!(token.expect("task panicked"));
            assert_eq!(token.expose(), "sessid-0");
        }
        assert_eq!(source.logins.load(Ordering::SeqCst), 1);
        assert_eq!(cache.sets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn forced_refresh_bypasses_a_populated_cache() {
        let cache = Arc::new(StubCache::default());
        let lock = Arc::new(StubLock::default());
        let source = Arc::new(StubSource::new());
        cache.seed("sessid-stale").await;

        let token = broker(&cache, &lock, &source).session(true).await;

        assert_eq!(assert_ok!(token).expose(), "sessid-0");
        assert_eq!(lock.acquisitions.load(Ordering::SeqCst), 1);
        assert_eq!(source.logins.load(Ordering::SeqCst), 1);
        assert_eq!(cache.value.lock().await.as_deref(), Some("sessid-0"));
    }

    #[tokio::test]
    async fn failed_login_surfaces_auth_failure_and_releases_the_lock() {
        let cache = Arc::new(StubCache::default());
        let lock = Arc::new(StubLock::default());
        let source = Arc::new(StubSource::failing_once());
        let broker = broker(&cache, &lock, &source);

        let outcome = broker.session(false).await;
        assert!(matches!(
            assert_err!(outcome),
            SessionError::AuthFailure(_)
        ));
        assert_eq!(cache.sets.load(Ordering::SeqCst), 0);

        // A released lock lets the next caller log in successfully.
        let token = broker.session(false).await;
        assert_eq!(assert_ok!(token).expose(), "sessid-1");
        assert_eq!(lock.acquisitions.load(Ordering::SeqCst), 2);
    }
}
