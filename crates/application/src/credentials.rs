//! Shared credential store.
//!
//! Owns the [`Credential`] for the process and writes every change through
//! the [`CredentialCache`] port, the way the original cookie-backed session
//! worked: set and clear always touch the persisted cookies, hydrate reads
//! them back once at startup.
//!
//! Persistence is best-effort: the in-memory state is authoritative, and a
//! cache failure is logged rather than surfaced, so a broken disk never
//! blocks an otherwise valid session.

use std::sync::Arc;

use cardlink_domain::{Credential, CredentialStatus, SessionCookies, TokenPair};
use tokio::sync::RwLock;

use crate::ports::CredentialCache;

/// Thread-safe store for the current session credential.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<RwLock<Credential>>,
    cache: Arc<dyn CredentialCache>,
}

impl CredentialStore {
    /// Creates a store in the hydrating state, backed by the given cache.
    #[must_use]
    pub fn new(cache: Arc<dyn CredentialCache>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Credential::empty())),
            cache,
        }
    }

    /// Loads persisted tokens and ends hydration.
    ///
    /// A second call is a no-op: once hydration has finished the store
    /// never re-enters the hydrating state.
    pub async fn hydrate(&self) {
        let mut cred = self.inner.write().await;
        if !cred.is_hydrating {
            return;
        }

        match self.cache.load().await {
            Ok(cookies) => {
                cred.access_token = cookies.access_token;
                cred.refresh_token = cookies.refresh_token;
                cred.user_id = cookies.user_id;
            }
            Err(err) => {
                tracing::warn!("failed to load persisted session: {err}");
            }
        }
        cred.is_hydrating = false;
    }

    /// Stores a full token set after login or registration.
    pub async fn set_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        user_id: Option<String>,
    ) {
        let mut cred = self.inner.write().await;
        cred.access_token = Some(access_token.into());
        cred.refresh_token = Some(refresh_token.into());
        cred.user_id = user_id;
        cred.is_hydrating = false;
        self.persist(&cred).await;
    }

    /// Replaces both tokens after a successful refresh, keeping the user id.
    pub async fn update_tokens(&self, pair: &TokenPair) {
        let mut cred = self.inner.write().await;
        cred.access_token = Some(pair.access_token.clone());
        cred.refresh_token = Some(pair.refresh_token.clone());
        cred.is_hydrating = false;
        self.persist(&cred).await;
    }

    /// Clears the session in memory and in the persisted cookies.
    pub async fn logout(&self) {
        let mut cred = self.inner.write().await;
        cred.access_token = None;
        cred.refresh_token = None;
        cred.user_id = None;
        cred.is_hydrating = false;
        if let Err(err) = self.cache.clear().await {
            tracing::warn!("failed to clear persisted session: {err}");
        }
    }

    /// A consistent copy of the current credential.
    pub async fn snapshot(&self) -> Credential {
        self.inner.read().await.clone()
    }

    /// The current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.inner.read().await.access_token.clone()
    }

    /// The current refresh token, if any.
    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.read().await.refresh_token.clone()
    }

    /// True iff an access token is held and hydration has finished.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_authenticated()
    }

    /// Session status for display.
    pub async fn status(&self) -> CredentialStatus {
        self.inner.read().await.status()
    }

    /// Writes the credential through the cache while still holding the
    /// write guard, so readers never observe unpersisted state.
    async fn persist(&self, cred: &Credential) {
        if let Err(err) = self.cache.store(&cred.to_cookies()).await {
            tracing::warn!("failed to persist session: {err}");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::MemoryCache;
    use cardlink_domain::SessionCookies;

    fn store_with(cookies: SessionCookies) -> (CredentialStore, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::with_cookies(cookies));
        (CredentialStore::new(Arc::clone(&cache) as _), cache)
    }

    #[tokio::test]
    async fn test_hydrate_loads_persisted_tokens() {
        let (store, _cache) = store_with(SessionCookies {
            access_token: Some("T1".to_string()),
            refresh_token: Some("R1".to_string()),
            user_id: Some("u1".to_string()),
        });

        assert!(!store.is_authenticated().await);
        store.hydrate().await;
        assert!(store.is_authenticated().await);
        assert_eq!(store.access_token().await.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_hydrate_is_one_shot() {
        let (store, cache) = store_with(SessionCookies::default());
        store.hydrate().await;
        store.set_tokens("T1", "R1", None).await;

        // A late hydrate must not resurrect the empty persisted state.
        cache.set(SessionCookies::default()).await;
        store.hydrate().await;
        assert_eq!(store.access_token().await.as_deref(), Some("T1"));
    }

    #[tokio::test]
    async fn test_set_tokens_persists() {
        let (store, cache) = store_with(SessionCookies::default());
        store.set_tokens("T1", "R1", Some("u1".to_string())).await;

        let persisted = cache.current().await;
        assert_eq!(persisted.access_token.as_deref(), Some("T1"));
        assert_eq!(persisted.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_update_tokens_keeps_user_id() {
        let (store, _cache) = store_with(SessionCookies::default());
        store.set_tokens("T1", "R1", Some("u1".to_string())).await;
        store
            .update_tokens(&TokenPair {
                access_token: "T2".to_string(),
                refresh_token: "R2".to_string(),
            })
            .await;

        let cred = store.snapshot().await;
        assert_eq!(cred.access_token.as_deref(), Some("T2"));
        assert_eq!(cred.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_cache() {
        let (store, cache) = store_with(SessionCookies::default());
        store.set_tokens("T1", "R1", None).await;
        store.logout().await;

        assert!(store.access_token().await.is_none());
        assert!(cache.current().await.is_empty());
        // Logout ends hydration too; the store is ready but unauthenticated.
        assert_eq!(
            store.status().await,
            cardlink_domain::CredentialStatus::NotAuthenticated
        );
    }
}
