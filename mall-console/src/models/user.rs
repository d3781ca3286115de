use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Route of the sign-in page; every unauthenticated redirect lands here.
pub const LOGIN_ROUTE: &str = "/authentication/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "admin")]
    Admin,
    #[serde(alias = "shop")]
    Shop,
    /// Buyer.
    #[serde(alias = "user")]
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Shop, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Shop => "SHOP",
            Role::User => "USER",
        }
    }

    /// ADMIN accounts are provisioned out of band.
    pub fn is_self_registrable(self) -> bool {
        matches!(self, Role::User | Role::Shop)
    }

    pub fn dashboard_route(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Shop => "/shop/dashboard",
            Role::User => "/user/dashboard",
        }
    }
}

/// Landing page for a session: the role dashboard, or sign-in without one.
pub fn default_route_for(role: Option<Role>) -> &'static str {
    role.map(Role::dashboard_route).unwrap_or(LOGIN_ROUTE)
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "SHOP" => Ok(Role::Shop),
            "USER" | "BUYER" => Ok(Role::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Identity record cached for the signed-in account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Profile name, or the local part of the email address.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.profile.as_ref().and_then(|p| p.name.as_deref()) {
            if !name.trim().is_empty() {
                return name.to_string();
            }
        }
        self.email.split('@').next().unwrap_or("User").to_string()
    }

    pub fn initials(&self) -> String {
        let name = self.display_name();
        let initials: String = name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect();
        match initials.chars().count() {
            0 => "U".to_string(),
            1 => name.chars().take(2).collect::<String>().to_uppercase(),
            _ => initials.to_uppercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: Option<&str>) -> User {
        User {
            id: "u1".to_string(),
            email: "marie.curie@mall.test".to_string(),
            role: Role::User,
            profile: name.map(|n| Profile {
                name: Some(n.to_string()),
                ..Profile::default()
            }),
            shop_id: None,
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_role_wire_format_is_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Shop).unwrap(), "\"SHOP\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_only_buyers_and_shops_self_register() {
        assert!(Role::User.is_self_registrable());
        assert!(Role::Shop.is_self_registrable());
        assert!(!Role::Admin.is_self_registrable());
    }

    #[test]
    fn test_dashboards_per_role() {
        assert_eq!(default_route_for(Some(Role::Admin)), "/admin/dashboard");
        assert_eq!(default_route_for(Some(Role::Shop)), "/shop/dashboard");
        assert_eq!(default_route_for(Some(Role::User)), "/user/dashboard");
        assert_eq!(default_route_for(None), LOGIN_ROUTE);
    }

    #[test]
    fn test_role_parses_case_insensitively() {
        assert_eq!("shop".parse::<Role>().unwrap(), Role::Shop);
        assert_eq!("Buyer".parse::<Role>().unwrap(), Role::User);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_accepts_mongo_id() {
        let user: User = serde_json::from_str(
            r#"{"_id":"65f0","email":"a@b.c","role":"SHOP","shopId":"s1","createdAt":"2024-03-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(user.id, "65f0");
        assert_eq!(user.shop_id.as_deref(), Some("s1"));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn test_display_name_and_initials() {
        assert_eq!(sample(Some("Marie Curie")).display_name(), "Marie Curie");
        assert_eq!(sample(Some("Marie Curie")).initials(), "MC");
        assert_eq!(sample(None).display_name(), "marie.curie");
        assert_eq!(sample(None).initials(), "MA");
    }
}
