use std::collections::HashMap;

use tracing::debug;

use super::principal::{CurrentUser, Permission};
use super::provider::AuthService;
use super::request_context::RequestContext;
use super::role::Role;

/// Request cookies, parsed from a `Cookie` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    values: HashMap<String, String>,
}

impl CookieJar {
    /// Parse `a=b; c=d`. Pairs without `=` or with an empty name are skipped;
    /// the first occurrence of a name wins.
    pub fn parse(header: &str) -> Self {
        let mut values = HashMap::new();
        for part in header.split(';') {
            let p = part.trim();
            let Some((k, v)) = p.split_once('=') else { continue; };
            let k = k.trim();
            if k.is_empty() { continue; }
            values.entry(k.to_string()).or_insert_with(|| v.trim().to_string());
        }
        Self { values }
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum SessionResolution {
    Authenticated(RequestContext),
    /// A normal outcome, not an error: callers route it to the login/guest view.
    Unauthenticated,
}

impl SessionResolution {
    pub fn into_context(self) -> RequestContext {
        match self {
            SessionResolution::Authenticated(ctx) => ctx,
            SessionResolution::Unauthenticated => RequestContext::guest(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionResolution::Authenticated(_))
    }
}

/// Turn request cookies into a caller context. Anything short of a valid session
/// with a recognised role is `Unauthenticated`; no role is ever assumed.
pub async fn resolve_session(cookies: &CookieJar, auth: &dyn AuthService) -> SessionResolution {
    let Some(data) = auth.get_session(cookies).await else {
        return SessionResolution::Unauthenticated;
    };
    let Some(role) = Role::parse(&data.role) else {
        debug!(target: "session", "session for user={} carries unknown role '{}'; treating as unauthenticated", data.user_id, data.role);
        return SessionResolution::Unauthenticated;
    };
    let user = CurrentUser { id: data.user_id.clone(), display_name: data.display_name };
    let permission = Permission::new(data.user_id, role);
    SessionResolution::Authenticated(RequestContext::authenticated(user, permission))
}
