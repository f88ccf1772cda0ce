use super::principal::{CurrentUser, Permission};

/// Everything a controller may know about the caller. Passed explicitly into
/// each call; nothing reads session state from globals.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub current_user: Option<CurrentUser>,
    pub permission: Option<Permission>,
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn authenticated(user: CurrentUser, permission: Permission) -> Self {
        Self { current_user: Some(user), permission: Some(permission), request_id: None }
    }

    pub fn with_request_id<S: Into<String>>(mut self, id: S) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.permission.is_some()
    }
}
