//! Signed-in user session.

use serde::{Deserialize, Serialize};

/// Bearer token and profile returned by the authentication service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// When the session was stored locally (RFC 3339)
    pub signed_in_at: String,
}

impl Session {
    pub fn new(token: String, user_id: i64, username: String) -> Self {
        Self {
            token,
            user_id,
            username,
            full_name: None,
            email: None,
            signed_in_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Name to greet the user with.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}
