//! Thin JSON-over-HTTP client for the taskdeck backend.

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

const USER_AGENT: &str = concat!("taskdeck/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Public,
    Authenticated,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Option<Session>) -> ApiResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| ApiError::InvalidUrl(format!("{base_url}: {err}")))?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn from_config(config: &AppConfig, session: Option<Session>) -> ApiResult<Self> {
        Self::new(config.api_url(), session)
    }

    /// Same connection pool, different credential.
    pub fn with_session(&self, session: Session) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session: Some(session),
        }
    }

    pub fn without_session(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let request = self.request(Method::GET, path, Access::Authenticated)?.query(query);
        decode(send(request).await?).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B, access: Access) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, access)?.json(body);
        decode(send(request).await?).await
    }

    /// PUT whose response body is not interpreted.
    pub(crate) async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        let request = self.request(Method::PUT, path, Access::Authenticated)?.json(body);
        send(request).await.map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<()> {
        let request = self.request(Method::DELETE, path, Access::Authenticated)?;
        send(request).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str, access: Access) -> ApiResult<RequestBuilder> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, path, "api request");
        let builder = self.http.request(method, url);
        match (&self.session, access) {
            (Some(session), _) => Ok(builder.bearer_auth(session.access_token())),
            (None, Access::Public) => Ok(builder),
            (None, Access::Authenticated) => Err(ApiError::NotAuthenticated),
        }
    }
}

async fn send(request: RequestBuilder) -> ApiResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), "api request rejected");
    Err(ApiError::Status {
        status: status.as_u16(),
        body: error_detail(body),
    })
}

/// Rejections carry `{"detail": "..."}`; anything else is kept verbatim.
fn error_detail(body: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Object(mut map)) => match map.remove("detail") {
            Some(serde_json::Value::String(detail)) => detail,
            _ => body,
        },
        _ => body,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}
