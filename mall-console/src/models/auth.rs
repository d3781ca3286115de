use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::{Profile, Role};

#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Role,

    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: Option<String>,

    pub phone: Option<String>,
}

impl RegisterRequest {
    pub fn profile(&self) -> Option<Profile> {
        if self.name.is_none() && self.phone.is_none() {
            return None;
        }
        Some(Profile {
            name: self.name.clone(),
            phone: self.phone.clone().filter(|p| !p.trim().is_empty()),
            avatar: None,
        })
    }
}

/// User fields as returned next to a token; the backend may send a partial
/// record (login only returns `{id, role}`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Token plus user, the body of login and registration responses.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    #[serde(default)]
    pub user: Option<UserRecord>,
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
}
