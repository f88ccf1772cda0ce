//! Static (role, resource) -> capability table. Pure lookups: safe to call on every
//! render, no storage, no caching, no history.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::crud::{Action, CrudPermissions};
use super::resource::Resource;
use crate::identity::{Permission, Role};

const NONE: CrudPermissions = CrudPermissions::none();
const D: CrudPermissions = CrudPermissions::from_flags("D");
const LD: CrudPermissions = CrudPermissions::from_flags("LD");
const LDA: CrudPermissions = CrudPermissions::from_flags("LDA");
const LDAE: CrudPermissions = CrudPermissions::from_flags("LDAE");
const LDAEX: CrudPermissions = CrudPermissions::from_flags("LDAEX");

/// Capabilities a role holds on a resource. Both matches are exhaustive:
/// adding a role or a resource does not compile until every gate is decided.
pub fn capabilities(role: Role, resource: Resource) -> CrudPermissions {
    use Resource::*;
    match role {
        Role::Admin => CrudPermissions::all(),
        Role::Supervisor => match resource {
            Classes | Members | Projects | Teams | Accompaniments | Conflicts => LDAE,
            Reports => LD,
            Events => LDAEX,
            Messages => LDA,
        },
        Role::Trainer => match resource {
            Classes | Members | Projects | Teams | Accompaniments => LD,
            Reports | Events => LDAE,
            Conflicts | Messages => LDA,
        },
        Role::Accompanist => match resource {
            Classes => NONE,
            Members | Projects | Teams | Accompaniments | Events => LD,
            Reports => LDAE,
            Conflicts | Messages => LDA,
        },
        Role::Member => match resource {
            Classes | Reports | Conflicts => NONE,
            Members => D,
            Projects | Teams | Accompaniments | Events => LD,
            Messages => LDA,
        },
    }
}

/// Capability set for a caller on a resource named by string (as it arrives from a route).
///
/// No session means no capabilities. An unknown resource name is a wiring mistake:
/// it is logged and fails closed with an empty set rather than erroring.
pub fn define_permissions(permission: Option<&Permission>, resource: &str) -> CrudPermissions {
    let Some(resource) = Resource::parse(resource) else {
        warn!(target: "permission", "unknown resource '{}' in permission lookup; denying all actions", resource);
        return NONE;
    };
    permissions_for(permission, resource)
}

/// Typed variant of `define_permissions`.
pub fn permissions_for(permission: Option<&Permission>, resource: Resource) -> CrudPermissions {
    match permission {
        Some(p) => capabilities(p.role, resource),
        None => NONE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allow: bool,
    pub reason: Option<String>,
}

fn allow(reason: &str) -> Decision { Decision { allow: true, reason: Some(reason.into()) } }
fn deny(reason: &str) -> Decision { Decision { allow: false, reason: Some(reason.into()) } }

/// Single-action check with a reason, for logs and trigger-time gates.
pub fn authorize(permission: Option<&Permission>, resource: Resource, action: Action) -> Decision {
    let out = match permission {
        None => deny("unauthenticated"),
        Some(p) if p.role.is_admin() => allow("role_admin"),
        Some(p) => {
            if capabilities(p.role, resource).allows(action) { allow("role_grant") } else { deny("role_denied") }
        }
    };
    debug!(
        target: "permission",
        "authorize user={:?} resource={} action={} allow={} reason={:?}",
        permission.map(|p| p.id.as_str()), resource, action.as_str(), out.allow, out.reason
    );
    out
}

/// Which records of a resource a role may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordScope {
    All,
    /// Only records whose `field` equals the caller's id.
    Owned { field: String },
}

impl RecordScope {
    fn owned(field: &str) -> Self { RecordScope::Owned { field: field.to_string() } }
}

pub fn record_scope(role: Role, resource: Resource) -> RecordScope {
    match (role, resource) {
        (Role::Member, Resource::Members) => RecordScope::owned("id"),
        (Role::Member, Resource::Projects) | (Role::Member, Resource::Accompaniments) => RecordScope::owned("member_id"),
        // trainer who runs the report's accompaniment
        (Role::Trainer, Resource::Reports) => RecordScope::owned("trainer_id"),
        _ => RecordScope::All,
    }
}
