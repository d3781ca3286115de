use mall_core::error::{status_message, ApiError};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::api_client::{ApiClient, LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH, REGISTER_PATH};
use crate::error::ClientError;
use crate::models::auth::{AuthPayload, LoginRequest, RegisterRequest, UserRecord};
use crate::models::{Envelope, Profile, Role, SearchParams, User};
use crate::session::{Session, SignOutReason};
use crate::utils::jwt::Token;

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<Profile>,
}

impl<'a> From<&'a RegisterRequest> for RegisterBody<'a> {
    fn from(request: &'a RegisterRequest) -> Self {
        Self {
            email: &request.email,
            password: &request.password,
            role: request.role,
            profile: request.profile(),
        }
    }
}

/// Sign-in, registration and profile calls. Every successful call writes
/// the token store and the session snapshot together.
pub struct AuthClient {
    api: Arc<ApiClient>,
}

impl AuthClient {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn session(&self) -> &Session {
        self.api.session()
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<User, ClientError> {
        request.validate()?;

        let pending = self.session().begin_request();
        tracing::info!(email = %request.email, "Signing in");

        let payload: Envelope<AuthPayload> = self.api.post(LOGIN_PATH, request).await?;
        self.complete_sign_in(LOGIN_PATH, payload.into_inner(), &request.email, pending.generation())
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        request.validate()?;
        if !request.role.is_self_registrable() {
            return Err(
                ApiError::new(400, format!("Role {} cannot self-register", request.role)).into(),
            );
        }

        let pending = self.session().begin_request();
        tracing::info!(email = %request.email, role = %request.role, "Registering account");

        let body = RegisterBody::from(request);
        let payload: Envelope<AuthPayload> = self.api.post(REGISTER_PATH, &body).await?;

        self.complete_sign_in(REGISTER_PATH, payload.into_inner(), &request.email, pending.generation())
    }

    /// Local sign-out. Never fails and can be called on an empty session.
    pub fn logout(&self) {
        self.session().end(SignOutReason::UserRequested);
    }

    /// Asks the backend to revoke the token, then signs out locally whatever
    /// the answer.
    pub async fn sign_out(&self) {
        if self.session().has_token() {
            if let Err(e) = self.api.execute(reqwest::Method::POST, LOGOUT_PATH, &[], Some(&json!({}))).await {
                tracing::warn!(error = %e, "Remote logout failed, clearing local session anyway");
            }
        }
        self.logout();
    }

    /// Re-reads the signed-in user from the backend and replaces the cached
    /// copy.
    pub async fn refresh_profile(&self) -> Result<User, ClientError> {
        if !self.session().has_token() {
            tracing::warn!("Profile refresh without a stored token");
            self.session().end(SignOutReason::Inconsistent);
            return Err(ApiError::new(401, status_message(401)).into());
        }

        let pending = self.session().begin_request();
        let user: Envelope<User> = self.api.get(PROFILE_PATH, &SearchParams::default()).await?;
        let user = user.into_inner();

        self.session().update_user(pending.generation(), &user)?;
        Ok(user)
    }

    fn complete_sign_in(
        &self,
        endpoint: &str,
        payload: AuthPayload,
        email: &str,
        generation: u64,
    ) -> Result<User, ClientError> {
        if payload.token.trim().is_empty() {
            return Err(ClientError::malformed(endpoint, "empty token"));
        }
        let token = Token::new(payload.token);
        let user = assemble_user(endpoint, payload.user.unwrap_or_default(), &token, email)?;

        self.session().establish(generation, &token, &user)?;
        Ok(user)
    }
}

/// Builds the session user from the response record, filling gaps from the
/// token claims and finally from the submitted email.
fn assemble_user(
    endpoint: &str,
    record: UserRecord,
    token: &Token,
    email: &str,
) -> Result<User, ClientError> {
    let claims = token.claims();

    let id = record
        .id
        .or_else(|| claims.and_then(|c| c.subject.clone()))
        .ok_or_else(|| ClientError::malformed(endpoint, "no user id in response or token"))?;
    let role = record
        .role
        .or_else(|| claims.and_then(|c| c.role()))
        .ok_or_else(|| ClientError::malformed(endpoint, "no role in response or token"))?;
    let email = record
        .email
        .or_else(|| claims.and_then(|c| c.email.clone()))
        .unwrap_or_else(|| email.to_string());

    Ok(User {
        id,
        email,
        role,
        profile: record.profile,
        shop_id: record.shop_id,
        is_active: record.is_active,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};

    fn token_with(payload: &str) -> Token {
        Token::new(format!(
            "h.{}.s",
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        ))
    }

    #[test]
    fn test_response_fields_win_over_claims() {
        let token = token_with(r#"{"sub":"claim-id","role":"USER","email":"claim@mall.test"}"#);
        let record = UserRecord {
            id: Some("resp-id".to_string()),
            role: Some(Role::Shop),
            ..Default::default()
        };
        let user = assemble_user(LOGIN_PATH, record, &token, "typed@mall.test").unwrap();
        assert_eq!(user.id, "resp-id");
        assert_eq!(user.role, Role::Shop);
        assert_eq!(user.email, "claim@mall.test");
    }

    #[test]
    fn test_claims_fill_missing_fields() {
        let token = token_with(r#"{"id":"u-9","role":"ADMIN"}"#);
        let user = assemble_user(LOGIN_PATH, UserRecord::default(), &token, "typed@mall.test").unwrap();
        assert_eq!(user.id, "u-9");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email, "typed@mall.test");
    }

    #[test]
    fn test_missing_role_is_malformed() {
        let token = Token::new("opaque");
        let record = UserRecord {
            id: Some("u-1".to_string()),
            ..Default::default()
        };
        let err = assemble_user(LOGIN_PATH, record, &token, "a@b.c").unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse { .. }));
    }

    #[test]
    fn test_register_body_omits_missing_profile() {
        let mut request = RegisterRequest {
            email: "new@mall.test".to_string(),
            password: "secret123".to_string(),
            role: Role::Shop,
            name: None,
            phone: None,
        };
        let body = serde_json::to_value(RegisterBody::from(&request)).unwrap();
        assert_eq!(body["role"], "SHOP");
        assert!(body.get("profile").is_none());

        request.name = Some("Corner Shop".to_string());
        let body = serde_json::to_value(RegisterBody::from(&request)).unwrap();
        assert_eq!(body["profile"]["name"], "Corner Shop");
    }
}
