use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Named category of user. Matching on this enum is always exhaustive so that a
/// new role forces every capability gate to be revisited.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
    Trainer,
    Accompanist,
    Member,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::Supervisor, Role::Trainer, Role::Accompanist, Role::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Trainer => "trainer",
            Role::Accompanist => "accompanist",
            Role::Member => "member",
        }
    }

    /// Case-insensitive; anything unrecognised is `None`, never a fallback role.
    pub fn parse(s: &str) -> Option<Role> {
        let s = s.trim();
        Role::ALL.into_iter().find(|r| r.as_str().eq_ignore_ascii_case(s))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_strict() {
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" trainer "), Some(Role::Trainer));
        assert_eq!(Role::parse("ACCOMPANIST"), Some(Role::Accompanist));
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn wire_name_round_trips_through_serde() {
        for r in Role::ALL {
            let v = serde_json::to_value(r).unwrap();
            assert_eq!(v, serde_json::Value::String(r.as_str().to_string()));
        }
    }
}
