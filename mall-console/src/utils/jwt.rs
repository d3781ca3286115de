use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::Role;

/// Claims carried in the payload segment of an access token.
#[derive(Debug, Clone, PartialEq)]
pub struct JwtClaims {
    pub subject: Option<String>,
    pub email: Option<String>,
    /// Raw role claim; see [`JwtClaims::role`].
    pub role: Option<String>,
    pub issued_at: Option<i64>,
    pub expires_at: Option<i64>,
}

impl JwtClaims {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    /// A token without an `exp` claim never expires client side.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0))
    }
}

/// Decode JWT claims without validation.
///
/// The signature is the backend's concern; the client only reads the payload
/// to learn who is signed in and until when. Any malformed input yields
/// `None`.
pub fn decode_jwt_claims(token: &str) -> Option<JwtClaims> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 {
        return None;
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .ok()?;

    let raw: Value = serde_json::from_slice(&payload).ok()?;
    let claims = raw.as_object()?;

    // Claim names vary between issuers; `sub`, `id` and `userId` all name
    // the subject. A claim of an unexpected type is skipped on its own.
    let subject = ["sub", "id", "userId"]
        .iter()
        .find_map(|name| claims.get(*name).and_then(identifier));

    Some(JwtClaims {
        subject,
        email: claims.get("email").and_then(text),
        role: claims.get("role").and_then(text),
        issued_at: claims.get("iat").and_then(timestamp),
        expires_at: claims.get("exp").and_then(timestamp),
    })
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn timestamp(value: &Value) -> Option<i64> {
    value.as_f64().map(|v| v as i64)
}

/// Bearer credential as stored, with its claims decoded once.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    raw: String,
    claims: Option<JwtClaims>,
}

impl Token {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let claims = decode_jwt_claims(&raw);
        Self { raw, claims }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> Option<&JwtClaims> {
        self.claims.as_ref()
    }

    /// Only a decoded `exp` in the past counts as expired; opaque tokens are
    /// left for the backend to reject.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.claims.as_ref().is_some_and(|c| c.is_expired_at(now))
    }
}
