use std::sync::Arc;

use crate::api::{ApiClient, ApiError, AuthClient};
use crate::models::Session;
use crate::services::store::KeyValueStore;

const SESSION_KEY: &str = "session";

/// Owns the signed-in state: gates protected operations and keeps the
/// session token in the local store between runs.
pub struct SessionService {
    api: ApiClient,
    auth: AuthClient,
    store: Arc<dyn KeyValueStore>,
}

impl SessionService {
    pub fn new(api: ApiClient, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            auth: AuthClient::new(api.clone()),
            api,
            store,
        }
    }

    /// Load a previously saved session into the shared client.
    pub async fn restore(&self) -> Option<Session> {
        let json = match self.store.get(SESSION_KEY).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read saved session: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<Session>(&json) {
            Ok(session) => {
                tracing::debug!(user_id = session.user.id, "Restored saved session");
                self.api.set_session(Some(session.clone()));
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Discarding unreadable saved session: {}", e);
                self.forget().await;
                None
            }
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.api.session()
    }

    /// Gate for protected operations. An `AuthError` here means the caller
    /// should send the user to sign in.
    pub fn require_session(&self) -> Result<Session, ApiError> {
        self.current()
            .ok_or_else(|| ApiError::AuthError("Not signed in".to_string()))
    }

    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<Session, ApiError> {
        let session = self.auth.sign_up(email, password, name).await?;
        self.save().await;
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let session = self.auth.sign_in(email, password).await?;
        self.save().await;
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let result = self.auth.sign_out().await;
        self.forget().await;
        result
    }

    /// Re-check the session with the backend and persist the outcome.
    pub async fn refresh(&self) -> Result<Option<Session>, ApiError> {
        let session = self.auth.get_session().await?;
        self.save().await;
        Ok(session)
    }

    /// Write the shared client's current session to the store, or remove the
    /// stored copy if the session has been cleared (e.g. after a 401).
    pub async fn save(&self) {
        let result = match self.current() {
            Some(session) => match serde_json::to_string(&session) {
                Ok(json) => self.store.set(SESSION_KEY, &json).await,
                Err(e) => Err(e.into()),
            },
            None => self.store.remove(SESSION_KEY).await,
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist session: {}", e);
        }
    }

    async fn forget(&self) {
        if let Err(e) = self.store.remove(SESSION_KEY).await {
            tracing::warn!("Failed to remove saved session: {}", e);
        }
    }
}
