use async_trait::async_trait;

/// Opaque session credential issued by the bureau's auth endpoint.
///
/// Every authenticated registry call embeds it; it stays valid until the
/// bureau expires it server-side.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Shared, TTL-backed store for the current session token.
///
/// The TTL is configured on the cache backend, not passed per call.
#[async_trait]
pub trait TokenCache: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, TokenCacheError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), TokenCacheError>;
}

#[derive(thiserror::Error, Debug)]
#[error("Token cache backend failure: {0}")]
pub struct TokenCacheError(#[from] pub anyhow::Error);

/// Mutual exclusion keyed by a string, usable across process instances.
///
/// The guard returned by `acquire` releases the key when dropped, so the lock
/// is released on every exit path of the critical section.
#[async_trait]
pub trait SessionLock: Send + Sync + 'static {
    type Guard: Send;

    async fn acquire(&self, key: &str) -> Result<Self::Guard, SessionLockError>;
}

#[derive(thiserror::Error, Debug)]
#[error("Session lock backend failure: {0}")]
pub struct SessionLockError(#[from] pub anyhow::Error);

/// Performs the bureau login call and returns a fresh session token.
#[async_trait]
pub trait SessionSource: Send + Sync + 'static {
    async fn login(&self) -> Result<SessionToken, LoginError>;
}

#[derive(thiserror::Error, Debug)]
#[error("Bureau login failed: {diagnostics}")]
pub struct LoginError {
    pub diagnostics: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("Bureau authentication failed: {0}")]
    AuthFailure(#[from] LoginError),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<TokenCacheError> for SessionError {
    fn from(error: TokenCacheError) -> Self {
        Self::Unexpected(error.into())
    }
}

impl From<SessionLockError> for SessionError {
    fn from(error: SessionLockError) -> Self {
        Self::Unexpected(error.into())
    }
}
