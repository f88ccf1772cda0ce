use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Domain entity types subject to CRUD gating.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Classes,
    Members,
    Projects,
    Teams,
    Accompaniments,
    Reports,
    Conflicts,
    Events,
    Messages,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Classes,
        Resource::Members,
        Resource::Projects,
        Resource::Teams,
        Resource::Accompaniments,
        Resource::Reports,
        Resource::Conflicts,
        Resource::Events,
        Resource::Messages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Resource::Classes => "classes",
            Resource::Members => "members",
            Resource::Projects => "projects",
            Resource::Teams => "teams",
            Resource::Accompaniments => "accompaniments",
            Resource::Reports => "reports",
            Resource::Conflicts => "conflicts",
            Resource::Events => "events",
            Resource::Messages => "messages",
        }
    }

    pub fn parse(s: &str) -> Option<Resource> {
        let s = s.trim();
        Resource::ALL.into_iter().find(|r| r.name().eq_ignore_ascii_case(s))
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matches_names_only() {
        for r in Resource::ALL {
            assert_eq!(Resource::parse(r.name()), Some(r));
            assert_eq!(Resource::parse(&r.name().to_uppercase()), Some(r));
        }
        assert_eq!(Resource::parse("class"), None);
        assert_eq!(Resource::parse("invoices"), None);
    }
}
