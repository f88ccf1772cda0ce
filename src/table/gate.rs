use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::permissions::{Action, CrudPermissions, Resource};

/// Trigger-time capability check. Rendering already hides disallowed controls;
/// this refuses the action itself if one is invoked anyway.
#[derive(Debug, Clone, Copy)]
pub struct ActionGate {
    resource: Resource,
    caps: CrudPermissions,
}

impl ActionGate {
    pub fn new(resource: Resource, caps: CrudPermissions) -> Self {
        Self { resource, caps }
    }

    pub fn capabilities(&self) -> CrudPermissions {
        self.caps
    }

    pub fn ensure(&self, action: Action) -> AppResult<()> {
        if self.caps.allows(action) {
            return Ok(());
        }
        warn!(target: "view", "refused {} on {}: capability not granted", action.as_str(), self.resource);
        Err(AppError::forbidden(
            "action_not_permitted".to_string(),
            format!("{} is not permitted on {}", action.as_str(), self.resource),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_what_caps_deny() {
        let caps = CrudPermissions { can_list: true, can_details: true, can_add: false, can_edit: true, can_delete: false };
        let gate = ActionGate::new(Resource::Reports, caps);
        assert!(gate.ensure(Action::Edit).is_ok());
        let err = gate.ensure(Action::Delete).unwrap_err();
        assert_eq!(err.http_status(), 403);
        assert_eq!(err.code_str(), "action_not_permitted");
        assert!(gate.ensure(Action::Add).is_err());
    }
}
