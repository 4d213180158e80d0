use std::sync::Mutex;

use super::client::IdentityClient;
use super::AuthenticatedUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Fresh,
    Stale,
}

/// One memoized identity result, keyed by the access token it was fetched
/// with. `value: None` is a cached "this token resolves to anonymous" — a
/// miss is the absence of an entry, not a None value.
#[derive(Debug, Clone)]
struct CacheEntry {
    key: String,
    value: Option<AuthenticatedUser>,
    state: CacheState,
}

/// In-memory mirror of the identity lookup, valid only while the cached
/// token string equals the current stored token string. Any mismatch forces
/// a re-fetch.
#[derive(Debug, Default)]
pub struct UserCache {
    entry: Mutex<Option<CacheEntry>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached user when the entry is fresh and keyed by this
    /// exact token. Outer `None` is a miss.
    pub fn lookup(&self, token: &str) -> Option<Option<AuthenticatedUser>> {
        let entry = self.entry.lock().expect("user cache lock");
        match entry.as_ref() {
            Some(e) if e.state == CacheState::Fresh && e.key == token => Some(e.value.clone()),
            _ => None,
        }
    }

    /// Replace the cache with a fresh entry for this token. Last write wins;
    /// the key records which token the value was fetched with.
    pub fn store(&self, token: &str, value: Option<AuthenticatedUser>) {
        let mut entry = self.entry.lock().expect("user cache lock");
        *entry = Some(CacheEntry {
            key: token.to_string(),
            value,
            state: CacheState::Fresh,
        });
    }

    /// Mark the current entry stale so the next navigation re-fetches even
    /// under an unchanged token (logout, token refresh).
    pub fn invalidate(&self) {
        let mut entry = self.entry.lock().expect("user cache lock");
        if let Some(e) = entry.as_mut() {
            e.state = CacheState::Stale;
        }
    }

    pub fn clear(&self) {
        let mut entry = self.entry.lock().expect("user cache lock");
        *entry = None;
    }
}

/// Memoized identity resolution.
///
/// At most one upstream fetch per distinct token value until the entry is
/// invalidated. A failed identity query resolves to anonymous (no retry);
/// the surrounding layer decides whether to prompt re-login. The token key
/// is re-validated synchronously inside `lookup`/`store`; the lock is not
/// held across the fetch, so two simultaneous navigations with the same new
/// token may both fetch and the last write wins.
pub async fn resolve(
    cache: &UserCache,
    client: &dyn IdentityClient,
    access_token: Option<&str>,
) -> Option<AuthenticatedUser> {
    let token = match access_token {
        Some(token) => token,
        None => {
            cache.clear();
            return None;
        }
    };

    if let Some(cached) = cache.lookup(token) {
        tracing::debug!("Identity cache hit");
        return cached;
    }

    let value = match client.fetch_authenticated_user(token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Identity query failed, treating user as anonymous: {}", e);
            None
        }
    };

    cache.store(token, value.clone());
    value
}
