use anyhow::Result;

use crate::client::{Access, ApiClient};
use crate::error::ApiResult;
use crate::model::{AuthResponse, Credentials, SignupRequest};
use crate::session::{Session, SessionStore};

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        let response: AuthResponse = self
            .client
            .post_json("/auth/login", credentials, Access::Public)
            .await?;
        tracing::info!(email = credentials.email.as_str(), "signed in");
        Ok(session_from(response))
    }

    pub async fn signup(&self, request: &SignupRequest) -> ApiResult<Session> {
        let response: AuthResponse = self
            .client
            .post_json("/auth/signup", request, Access::Public)
            .await?;
        tracing::info!(email = request.email.as_str(), "account created");
        Ok(session_from(response))
    }

    /// Drops the persisted credential; the backend keeps no server-side session to revoke.
    pub fn logout(&self, store: &SessionStore) -> Result<()> {
        store.clear()?;
        tracing::info!("signed out");
        Ok(())
    }
}

fn session_from(response: AuthResponse) -> Session {
    if let Some(kind) = response.token_type.as_deref() {
        if !kind.eq_ignore_ascii_case("bearer") {
            tracing::warn!(token_type = kind, "unexpected token type; sending as bearer");
        }
    }
    Session::new(response.access_token)
}
