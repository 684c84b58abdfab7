//! User model for the identity endpoint and login.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Backend role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Reader,
}

/// Identity returned by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: u64,
    /// Display name
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "mail")]
    pub email: String,
    pub role: Role,
    #[serde(rename = "avatar", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Personal homepage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub activated: bool,
    /// Creation time (Unix millis, as sent by the backend)
    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: i64,
}

impl UserIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Username/password pair for `POST /auth/login/{username}`.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_wire_names() {
        let identity: UserIdentity = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Ada",
            "mail": "ada@example.com",
            "avatar": "https://example.com/ada.png",
            "role": "admin",
            "activated": true,
            "createdAt": 1700000000000i64,
            "updatedAt": 1700000001000i64
        }))
        .unwrap();

        assert_eq!(identity.display_name, "Ada");
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(identity.avatar_url.as_deref(), Some("https://example.com/ada.png"));
        assert!(identity.url.is_none());
        assert!(identity.is_admin());
    }

    #[test]
    fn test_credentials_validation() {
        assert!(LoginCredentials::new("a", "p").validate().is_ok());
        assert!(LoginCredentials::new("", "p").validate().is_err());
        assert!(LoginCredentials::new("a", "").validate().is_err());
    }
}
