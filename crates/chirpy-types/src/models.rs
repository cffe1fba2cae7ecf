use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: Id,
    pub author_id: Id,
    pub body: String,
}

/// A user as stored in the snapshot. Carries the password hash and token
/// bookkeeping, so it must never be serialized into an API response; use
/// [`UserView`] for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Id,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub is_upgraded: bool,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub access_token_ttl: i64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub refresh_token_ttl: i64,
    /// Unix seconds after which `refresh_token` is no longer accepted. Zero
    /// when no refresh token has been issued.
    #[serde(default)]
    pub refresh_token_expires_at: i64,
}

/// Outward-facing user shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Id,
    pub email: String,
    pub is_upgraded: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_upgraded: user.is_upgraded,
        }
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_upgraded: user.is_upgraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_view_drops_secrets() {
        let user = User {
            id: 7,
            email: "a@b.com".into(),
            password_hash: "$argon2id$...".into(),
            is_upgraded: true,
            access_token: "jwt".into(),
            access_token_ttl: 3600,
            refresh_token: "abc".into(),
            refresh_token_ttl: 60,
            refresh_token_expires_at: 100,
        };

        let json = serde_json::to_value(UserView::from(&user)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 7, "email": "a@b.com", "is_upgraded": true })
        );
    }

    #[test]
    fn older_user_records_fill_defaults() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"email":"x@y.z","password_hash":"h"}"#,
        )
        .unwrap();
        assert!(!user.is_upgraded);
        assert!(user.refresh_token.is_empty());
        assert_eq!(user.refresh_token_expires_at, 0);
    }
}
