//! Session context: the access token and user profile, persisted through a
//! [`LocalStore`] and shared by every component that talks to the API.

use std::sync::Arc;

use shared::protocol::User;
use storage::{LocalStore, TOKEN_KEY, USER_KEY};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    Logout,
    Unauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Established(User),
    Cleared { reason: ClearReason },
}

pub struct SessionStore {
    store: Arc<dyn LocalStore>,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            store,
            current: RwLock::new(None),
            events,
        })
    }

    /// Creates the store and loads whatever session was persisted last run.
    pub async fn hydrated(store: Arc<dyn LocalStore>) -> ClientResult<Arc<Self>> {
        let session = Self::new(store);
        session.hydrate().await?;
        Ok(session)
    }

    /// Loads token and user from the local store. A token without a decodable
    /// user (or the reverse) is treated as no session, and both entries are
    /// dropped so they stay in lockstep.
    pub async fn hydrate(&self) -> ClientResult<Option<User>> {
        let token = self.store.get(TOKEN_KEY).await?;
        let user_raw = self.store.get(USER_KEY).await?;

        let restored = match (token, user_raw) {
            (Some(token), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(Session { token, user }),
                Err(err) => {
                    warn!(error = %err, "discarding undecodable persisted user");
                    None
                }
            },
            (None, None) => None,
            _ => {
                warn!("discarding half-persisted session");
                None
            }
        };

        if restored.is_none() {
            self.store.remove_many(&[TOKEN_KEY, USER_KEY]).await?;
        }

        let user = restored.as_ref().map(|s| s.user.clone());
        *self.current.write().await = restored;
        Ok(user)
    }

    pub async fn establish(&self, session: Session) -> ClientResult<()> {
        let user_json = serde_json::to_string(&session.user).map_err(|source| {
            ClientError::Decode {
                endpoint: "local user profile".to_string(),
                source,
            }
        })?;
        self.store
            .set_many(&[(TOKEN_KEY, session.token.as_str()), (USER_KEY, user_json.as_str())])
            .await?;

        info!(user_id = %session.user.id, role = %session.user.role, "session established");
        let user = session.user.clone();
        *self.current.write().await = Some(session);
        let _ = self.events.send(SessionEvent::Established(user));
        Ok(())
    }

    /// Removes both persisted entries and notifies subscribers. In-memory
    /// state is cleared even when the local store fails.
    pub async fn clear(&self, reason: ClearReason) -> ClientResult<()> {
        let had_session = self.current.write().await.take().is_some();
        let persisted = self.store.remove_many(&[TOKEN_KEY, USER_KEY]).await;

        if had_session {
            info!(?reason, "session cleared");
        }
        let _ = self.events.send(SessionEvent::Cleared { reason });
        persisted.map_err(ClientError::from)
    }

    pub async fn token(&self) -> Option<String> {
        self.current.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
