use std::sync::Arc;

use crate::gateway::types::User;
use crate::storage::{KeyValueStore, StorageError, TOKEN_KEY, USER_KEY};

/// Session credential and cached profile, kept in the local store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn login(&self, token: &str, user: &User) -> Result<(), StorageError> {
        let profile = serde_json::to_string(user)?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &profile)?;
        tracing::info!(user = %user.username, "session started");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        tracing::info!("session cleared");
        Ok(())
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self
            .store
            .get(TOKEN_KEY)?
            .filter(|t| !t.trim().is_empty()))
    }

    /// Cached profile. An unreadable entry is treated as absent.
    pub fn user(&self) -> Option<User> {
        let raw = match self.store.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "unable to read cached user");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "cached user is malformed");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    pub fn is_email_verified(&self) -> bool {
        self.user().map(|u| u.is_verified).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::gateway::types::User;
    use crate::storage::{KeyValueStore, MemoryStore, USER_KEY};
    use std::sync::Arc;

    fn user(verified: bool) -> User {
        User {
            id: "u1".to_string(),
            username: "olena".to_string(),
            email: "olena@example.com".to_string(),
            is_verified: verified,
            avatar: None,
        }
    }

    #[test]
    fn login_then_logout_round_trip() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        assert!(!session.is_authenticated());

        session.login("tok", &user(true)).expect("login");
        assert!(session.is_authenticated());
        assert!(session.is_email_verified());
        assert_eq!(session.token().expect("token").as_deref(), Some("tok"));
        assert_eq!(session.user().map(|u| u.username), Some("olena".to_string()));

        session.logout().expect("logout");
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn malformed_profile_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set(USER_KEY, "{not json").expect("set");
        let session = Session::new(store);
        assert!(session.user().is_none());
        assert!(!session.is_email_verified());
    }

    #[test]
    fn blank_token_is_not_a_session() {
        let store = Arc::new(MemoryStore::new());
        store.set("token", "  ").expect("set");
        assert!(!Session::new(store).is_authenticated());
    }
}
