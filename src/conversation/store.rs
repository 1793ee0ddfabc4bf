use super::session::Session;
use crate::event::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared map of active sessions, keyed by user.
///
/// The map only needs to be safe across distinct users. Within one user the
/// dispatcher already serializes events, so get/mutate/put without holding
/// the lock across the step is fine.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<UserId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get_or_create(&self, user_id: UserId) -> Session {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id)
            .or_insert_with(|| Session::new(user_id))
            .clone()
    }

    pub async fn put(&self, session: Session) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.user_id, session);
    }

    pub async fn delete(&self, user_id: UserId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&user_id);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
