//! Ephemeral session state.
//!
//! A [`SessionStore`] lives as long as one user session and is never
//! persisted. Values are plain strings; login flags hold the literal `"true"`.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::trace;

/// Set to `"true"` while an admin is logged in.
pub const ADMIN_AUTHENTICATED: &str = "adminAuthenticated";
/// ISO-8601 time of the admin login.
pub const ADMIN_LOGIN_TIME: &str = "adminLoginTime";
/// Set to `"true"` while a student is logged in.
pub const STUDENT_AUTHENTICATED: &str = "studentAuthenticated";
/// JSON snapshot of the logged-in student record.
pub const CURRENT_STUDENT: &str = "currentStudent";

/// In-memory key-value session store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).cloned()
    }

    /// Stores `value` under `key`.
    pub async fn set(&self, key: &str, value: impl Into<String>) {
        trace!("Session set {}", key);
        self.inner.write().await.insert(key.to_string(), value.into());
    }

    /// Removes `key`.
    pub async fn remove(&self, key: &str) {
        trace!("Session remove {}", key);
        self.inner.write().await.remove(key);
    }

    /// Whether `key` holds exactly `"true"`.
    pub async fn is_flag_set(&self, key: &str) -> bool {
        self.inner.read().await.get(key).is_some_and(|v| v == "true")
    }

    /// Drops every key, ending the session.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let session = SessionStore::new();
        assert!(session.get(ADMIN_LOGIN_TIME).await.is_none());

        session.set(ADMIN_LOGIN_TIME, "2026-10-19T10:00:00.000Z").await;
        assert_eq!(
            session.get(ADMIN_LOGIN_TIME).await.as_deref(),
            Some("2026-10-19T10:00:00.000Z")
        );

        session.remove(ADMIN_LOGIN_TIME).await;
        assert!(session.get(ADMIN_LOGIN_TIME).await.is_none());
    }

    #[tokio::test]
    async fn test_flag_requires_literal_true() {
        let session = SessionStore::new();
        assert!(!session.is_flag_set(ADMIN_AUTHENTICATED).await);

        session.set(ADMIN_AUTHENTICATED, "yes").await;
        assert!(!session.is_flag_set(ADMIN_AUTHENTICATED).await);

        session.set(ADMIN_AUTHENTICATED, "true").await;
        assert!(session.is_flag_set(ADMIN_AUTHENTICATED).await);
    }

    #[tokio::test]
    async fn test_clones_share_state_and_clear() {
        let session = SessionStore::new();
        let other = session.clone();

        other.set(STUDENT_AUTHENTICATED, "true").await;
        assert!(session.is_flag_set(STUDENT_AUTHENTICATED).await);

        session.clear().await;
        assert!(!other.is_flag_set(STUDENT_AUTHENTICATED).await);
    }
}
