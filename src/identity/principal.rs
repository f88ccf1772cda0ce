use serde::{Deserialize, Serialize};

use super::role::Role;

/// Identity as reported by the auth service. Read-only to this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

/// Role + id of the signed-in user. Built once per request, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    pub id: String,
    #[serde(rename = "type")]
    pub role: Role,
}

impl Permission {
    pub fn new<S: Into<String>>(id: S, role: Role) -> Self {
        Self { id: id.into(), role }
    }
}

/// What an `AuthService` hands back for a live session. `role` stays a raw string
/// here; turning it into a `Role` is the resolver's job so it can fail closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    pub role: String,
}
