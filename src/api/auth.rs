use serde::Serialize;

use super::error::ApiError;
use super::http::ApiClient;
use super::validate;
use crate::models::Session;

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Session, ApiError> {
        validate::registration(email, password, None, name)?;

        let session: Session = self
            .api
            .post_public(
                "/auth/sign-up",
                &SignUpRequest {
                    email,
                    password,
                    name: name.trim(),
                },
            )
            .await?;
        tracing::info!(user_id = session.user.id, "Account created");
        self.api.set_session(Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let session: Session = self
            .api
            .post_public("/auth/sign-in", &SignInRequest { email, password })
            .await?;
        tracing::info!(user_id = session.user.id, "Signed in");
        self.api.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Invalidate the session remotely. The local session is cleared even if
    /// the backend call fails.
    pub async fn sign_out(&self) -> Result<(), ApiError> {
        if self.api.session().is_none() {
            return Ok(());
        }
        let result = self.api.post_empty("/auth/sign-out").await;
        self.api.set_session(None);
        if let Err(e) = &result {
            tracing::warn!("Remote sign-out failed: {}", e);
        }
        result
    }

    /// Ask the backend for the current session. `None` when there is no local
    /// token or the backend no longer accepts it.
    pub async fn get_session(&self) -> Result<Option<Session>, ApiError> {
        if self.api.session().is_none() {
            return Ok(None);
        }
        match self.api.get::<Session>("/auth/session").await {
            Ok(session) => {
                self.api.set_session(Some(session.clone()));
                Ok(Some(session))
            }
            Err(e) if e.requires_sign_in() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
