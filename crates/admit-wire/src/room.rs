//! Deterministic room keys.
//!
//! A room key is a pure function of (role context, counterparty id) so that
//! both ends of a conversation can reconstruct it without a lookup.

use crate::session::{Role, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical conversation channel key, e.g. `"admin-42"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomKey(String);

impl RoomKey {
    /// Key for a direct conversation between the given role context and a
    /// counterparty. Stable and collision-free for distinct (role, id) pairs.
    pub fn direct(context: Role, counterparty: UserId) -> Self {
        RoomKey(format!("{}-{}", context, counterparty))
    }

    /// Wrap a server-provided raw key.
    pub fn new(raw: impl Into<String>) -> Self {
        RoomKey(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_key_deterministic() {
        let a = RoomKey::direct(Role::Admin, 42);
        let b = RoomKey::direct(Role::Admin, 42);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "admin-42");
    }

    #[test]
    fn test_room_key_no_collisions() {
        let mut seen = std::collections::HashSet::new();
        for role in [Role::User, Role::Admin, Role::Reviewer] {
            for id in 0..100 {
                assert!(seen.insert(RoomKey::direct(role, id)));
            }
        }
    }

    #[test]
    fn test_room_key_raw_roundtrip() {
        let key = RoomKey::new("admin-7");
        assert_eq!(key, RoomKey::direct(Role::Admin, 7));
    }
}
