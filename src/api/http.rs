//! Shared HTTP plumbing for the backend clients.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CACHE_CONTROL};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use super::error::ApiError;
use crate::models::Session;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whether a request must carry the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authenticated,
}

/// Backend client shared by the auth, task and chat clients.
///
/// Clones share the connection pool and the session slot, so signing in
/// through one clone authenticates all of them.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<RwLock<Option<Session>>>,
}

impl ApiClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: Url, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client, using defaults without timeouts: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url,
            session: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> Option<Session> {
        match self.session.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_session(&self, session: Option<Session>) {
        let mut guard = match self.session.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = session;
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    fn authorize(&self, req: RequestBuilder, access: Access) -> Result<RequestBuilder, ApiError> {
        match (access, self.session()) {
            (_, Some(session)) => Ok(req.header(AUTHORIZATION, format!("Bearer {}", session.token))),
            (Access::Public, None) => Ok(req),
            (Access::Authenticated, None) => {
                Err(ApiError::AuthError("Not signed in".to_string()))
            }
        }
    }

    pub(crate) async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let req = self.client.get(self.url(path));
        let text = self.send(req, Access::Authenticated).await?;
        decode(&text)
    }

    pub(crate) async fn post<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let req = self.client.post(self.url(path)).json(body);
        let text = self.send(req, Access::Authenticated).await?;
        decode(&text)
    }

    /// POST without a session, used by sign-up and sign-in.
    pub(crate) async fn post_public<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let req = self.client.post(self.url(path)).json(body);
        let text = self.send(req, Access::Public).await?;
        decode(&text)
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let req = self.client.post(self.url(path));
        self.send(req, Access::Authenticated).await.map(|_| ())
    }

    pub(crate) async fn patch<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, ApiError> {
        let req = self.client.patch(self.url(path)).json(body);
        let text = self.send(req, Access::Authenticated).await?;
        decode(&text)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let req = self.client.delete(self.url(path));
        self.send(req, Access::Authenticated).await.map(|_| ())
    }

    /// Uncached HEAD request. Returns the status without mapping it to an error.
    pub async fn head(&self, path: &str) -> Result<StatusCode, ApiError> {
        let response = self
            .client
            .head(self.url(path))
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        Ok(response.status())
    }

    async fn send(&self, req: RequestBuilder, access: Access) -> Result<String, ApiError> {
        let req = self.authorize(req, access)?;
        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(text);
        }

        let err = ApiError::from_status(status, &text);
        if access == Access::Authenticated && err.requires_sign_in() && self.session().is_some() {
            tracing::warn!("Session rejected by backend, clearing local session");
            self.set_session(None);
        }
        Err(err)
    }
}

fn decode<R: DeserializeOwned>(text: &str) -> Result<R, ApiError> {
    serde_json::from_str(text)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn client() -> ApiClient {
        ApiClient::new(Url::parse("http://localhost:8000/api/").unwrap())
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        assert_eq!(client().url("/tasks/3"), "http://localhost:8000/api/tasks/3");
    }

    #[test]
    fn test_clones_share_session() {
        let a = client();
        let b = a.clone();
        a.set_session(Some(Session {
            token: "t".to_string(),
            user: User {
                id: 1,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
        }));
        assert_eq!(b.session().map(|s| s.user.id), Some(1));
        b.set_session(None);
        assert!(a.session().is_none());
    }

    #[tokio::test]
    async fn test_authenticated_call_without_session_is_rejected_locally() {
        let err = client().get::<serde_json::Value>("/tasks").await.unwrap_err();
        assert!(err.requires_sign_in());
    }
}
