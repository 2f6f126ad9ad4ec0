//! Wire and session models shared by the auth and api layers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User profile as returned by the server.
///
/// Only `id` is relied upon; everything else the server sends is kept in
/// `extra` so the persisted record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name to show in the UI: nickname, then username, then the id
    pub fn display_name(&self) -> String {
        [self.nickname.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("user #{}", self.id))
    }
}

/// Login payload for `POST /auth/login/`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Hand-written so passwords never end up in logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sign-up payload for `POST /auth/register/`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub nickname: String,
    pub password: String,
    pub password_confirm: String,
}

impl Registration {
    /// Client-side checks mirroring the server's: required fields and
    /// matching password confirmation.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err("username and password required".to_string());
        }
        if self.password != self.password_confirm {
            return Err("passwords do not match".to_string());
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("nickname", &self.nickname)
            .finish_non_exhaustive()
    }
}

/// Response body of `POST /auth/login/`.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Response body of `POST /auth/register/`: the user record with the
/// token inlined next to its fields.
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterResponse {
    pub token: String,
    #[serde(flatten)]
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_preserves_unknown_fields() {
        let json = r#"{"id":1,"username":"a","nickname":"A","avatar":"x.png"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.extra.get("avatar"), Some(&Value::from("x.png")));

        let back: Value = serde_json::to_value(&user).unwrap();
        assert_eq!(back["avatar"], "x.png");
        assert_eq!(back["nickname"], "A");
    }

    #[test]
    fn test_user_without_username_round_trips() {
        let json = r#"{"id":1,"name":"A"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.username.is_none());
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back, serde_json::json!({"id": 1, "name": "A"}));
    }

    #[test]
    fn test_user_display_name_falls_back_to_username() {
        let mut user: User = serde_json::from_str(r#"{"id":2}"#).unwrap();
        assert_eq!(user.display_name(), "user #2");
        user.username = Some("bob".to_string());
        assert_eq!(user.display_name(), "bob");
        user.nickname = Some(String::new());
        assert_eq!(user.display_name(), "bob");
        user.nickname = Some("Bobby".to_string());
        assert_eq!(user.display_name(), "Bobby");
    }

    #[test]
    fn test_register_response_splits_token_from_user() {
        let json = r#"{"id":7,"username":"c","nickname":"C","token":"abc"}"#;
        let resp: RegisterResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.id, 7);
        assert!(!resp.user.extra.contains_key("token"));
    }

    #[test]
    fn test_registration_validation() {
        let mut reg = Registration {
            username: "u".to_string(),
            nickname: "n".to_string(),
            password: "pw".to_string(),
            password_confirm: "pw".to_string(),
        };
        assert!(reg.validate().is_ok());

        reg.password_confirm = "other".to_string();
        assert!(reg.validate().is_err());

        reg.username = "  ".to_string();
        assert_eq!(reg.validate().unwrap_err(), "username and password required");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }
}
