//! In-memory session storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use auth0_sample_core::auth::{
    is_session_expired, AuthUserSession, Result, SessionId, SessionRepository,
};

/// Process-local session store.
///
/// Cloning is cheap and clones share the same map. A session past its
/// `expires_at` is never returned; it is removed on the read that finds it,
/// or by [`SessionStore::cleanup_expired`].
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, AuthUserSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, expired ones included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop every session expired at `now` and return how many went.
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !is_session_expired(session, now));
        before - sessions.len()
    }
}

#[async_trait]
impl SessionRepository for SessionStore {
    async fn get_session(&self, id: &SessionId) -> Result<Option<AuthUserSession>> {
        let now = Utc::now();
        let lookup = self
            .sessions
            .read()
            .await
            .get(id)
            .map(|session| (!is_session_expired(session, now)).then(|| session.clone()));

        match lookup {
            None => Ok(None),
            Some(Some(session)) => Ok(Some(session)),
            Some(None) => {
                tracing::debug!(session_id = %id, "Dropping expired session");
                self.sessions.write().await.remove(id);
                Ok(None)
            }
        }
    }

    async fn save_session(&self, session: &AuthUserSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<()> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sid(id: &str) -> SessionId {
        SessionId::new(id.to_string())
    }

    fn session_expiring_in(id: &str, ttl: Duration) -> AuthUserSession {
        let now = Utc::now();
        let mut session = AuthUserSession::new(sid(id), now);
        session.expires_at = now + ttl;
        session
    }

    #[tokio::test]
    async fn saved_session_is_returned() {
        let store = SessionStore::new();
        let mut session = session_expiring_in("s1", Duration::hours(24));
        session.user_name = Some("jdoe".to_string());
        store.save_session(&session).await.unwrap();

        let found = store.get_session(&sid("s1")).await.unwrap().unwrap();
        assert_eq!(found.user_name.as_deref(), Some("jdoe"));
        assert!(store.get_session(&sid("other")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_replaces_previous_version() {
        let store = SessionStore::new();
        let mut session = session_expiring_in("s1", Duration::hours(24));
        store.save_session(&session).await.unwrap();

        session.is_authenticated = true;
        store.save_session(&session).await.unwrap();

        let found = store.get_session(&sid("s1")).await.unwrap().unwrap();
        assert!(found.is_authenticated);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn expired_session_is_dropped_on_read() {
        let store = SessionStore::new();
        store
            .save_session(&session_expiring_in("s1", Duration::seconds(-1)))
            .await
            .unwrap();

        assert!(store.get_session(&sid("s1")).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = SessionStore::new();
        store
            .save_session(&session_expiring_in("s1", Duration::hours(1)))
            .await
            .unwrap();

        store.delete_session(&sid("s1")).await.unwrap();
        store.delete_session(&sid("s1")).await.unwrap();
        assert!(store.get_session(&sid("s1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cleanup_expired_keeps_live_sessions() {
        let store = SessionStore::new();
        store
            .save_session(&session_expiring_in("live", Duration::hours(1)))
            .await
            .unwrap();
        store
            .save_session(&session_expiring_in("old-1", Duration::minutes(-5)))
            .await
            .unwrap();
        store
            .save_session(&session_expiring_in("old-2", Duration::days(-1)))
            .await
            .unwrap();

        assert_eq!(store.cleanup_expired(Utc::now()).await, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.get_session(&sid("live")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clones_share_sessions() {
        let store = SessionStore::new();
        let clone = store.clone();
        store
            .save_session(&session_expiring_in("s1", Duration::hours(1)))
            .await
            .unwrap();

        assert!(clone.get_session(&sid("s1")).await.unwrap().is_some());
    }
}
