//! Authenticated session identity.
//!
//! The session is produced by the auth collaborator (login flow) and is
//! read-only input to the chat client: it drives the connection handshake
//! and every durable call's bearer header.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned user identifier.
pub type UserId = i64;

/// Role of the authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Reviewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Reviewer => "reviewer",
        };
        write!(f, "{}", s)
    }
}

/// Authenticated identity driving one live connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    /// Bearer token attached to durable calls and the live handshake.
    pub token: String,
}

impl Session {
    pub fn new(user_id: UserId, display_name: impl Into<String>, role: Role, token: impl Into<String>) -> Self {
        Session {
            user_id,
            display_name: display_name.into(),
            role,
            token: token.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Reviewer.to_string(), "reviewer");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Reviewer).unwrap();
        assert_eq!(json, "\"reviewer\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
