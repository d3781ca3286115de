use mall_core::error::{message_from_body, ApiError};
use mall_core::observability::TracedClientExt;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiSettings;
use crate::error::ClientError;
use crate::models::{Paginated, SearchParams};
use crate::session::{Session, SignOutReason};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const PROFILE_PATH: &str = "/auth/profile";

/// Calls that carry credentials in their body and never a bearer token.
fn is_credential_path(path: &str) -> bool {
    matches!(path, LOGIN_PATH | REGISTER_PATH)
}

/// A 401 from these means "wrong credentials" or "already signed out",
/// not "session expired".
fn keeps_session_on_unauthorized(path: &str) -> bool {
    matches!(path, LOGIN_PATH | REGISTER_PATH | LOGOUT_PATH)
}

/// HTTP client for the mall backend. Attaches the stored bearer token,
/// normalizes failures to [`ApiError`] and ends the session on a 401.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, session: Arc<Session>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &settings.base_url, session))
    }

    pub fn with_client(client: Client, base_url: &str, session: Arc<Session>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Sends one request and returns the response when its status is 2xx.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.traced_request(method.clone(), &url);

        if !query.is_empty() {
            request = request.query(query);
        }
        let generation = self.session.generation();
        if !is_credential_path(path) {
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token.as_str());
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let request_id = request.request_id().to_string();
        let response = request.send().await.map_err(|e| {
            tracing::error!(%method, %url, %request_id, error = %e, "Failed to reach API");
            ApiError::unreachable()
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%method, path, status = status.as_u16(), %request_id, "API call succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let backend_message = message_from_body(&body);
        let error = if is_credential_path(path) {
            ApiError::for_auth(status.as_u16(), backend_message)
        } else {
            ApiError::from_response(status.as_u16(), backend_message)
        };

        tracing::warn!(
            %method,
            path,
            status = error.status,
            message = %error.message,
            %request_id,
            "API call failed"
        );

        if error.is_unauthorized() && !keeps_session_on_unauthorized(path) {
            self.session.end_since(generation, SignOutReason::Unauthorized);
        }

        Err(error.into())
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(path, error = %e, "Failed to decode API response");
            ClientError::malformed(path, e)
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &SearchParams,
    ) -> Result<T, ClientError> {
        let response = self
            .execute::<()>(Method::GET, path, &params.to_query(), None)
            .await?;
        Self::decode(path, response).await
    }

    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &SearchParams,
    ) -> Result<Paginated<T>, ClientError> {
        self.get(path, params).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.execute(Method::POST, path, &[], Some(body)).await?;
        Self::decode(path, response).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.execute(Method::PUT, path, &[], Some(body)).await?;
        Self::decode(path, response).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.execute(Method::PATCH, path, &[], Some(body)).await?;
        Self::decode(path, response).await
    }

    /// DELETE; any 2xx body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute::<()>(Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
