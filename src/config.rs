//! Application configuration: process-wide settings read from the environment,
//! plus layered table settings (global defaults overlaid by per-resource overrides).

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::permissions::Resource;

/// Process-wide settings. Unspecified environment variables keep the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub http_host: String,
    pub http_port: u16,
    /// Rows per table page unless a resource override says otherwise
    pub page_size: usize,
    pub session_ttl_secs: u64,
    /// HMAC key for session tokens; random per process when unset
    pub session_secret: Option<String>,
    pub cookie_name: String,
    /// Adds `Secure` to the session cookie; turn off only for plain-http development
    pub cookie_secure: bool,
    /// Where a signed-in user lacking a capability is sent
    pub forbidden_redirect: String,
    /// Where a guest is sent
    pub login_redirect: String,
    /// Optional JSON seed: users and records for the in-memory backend
    pub seed_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_host: "127.0.0.1".to_string(),
            http_port: 7979,
            page_size: 10,
            session_ttl_secs: 60 * 60,
            session_secret: None,
            cookie_name: "suivi_session".to_string(),
            cookie_secure: true,
            forbidden_redirect: "/".to_string(),
            login_redirect: "/login".to_string(),
            seed_file: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::user("invalid_config".to_string(), format!("{} has an invalid value: '{}'", name, raw)))
}

impl AppConfig {
    /// Defaults overlaid with `SUIVI_*` environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as `from_env` but reads through `lookup`, so tests need not touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(v) = lookup("SUIVI_HTTP_HOST") { cfg.http_host = v; }
        if let Some(v) = lookup("SUIVI_HTTP_PORT") { cfg.http_port = parse_var("SUIVI_HTTP_PORT", &v)?; }
        if let Some(v) = lookup("SUIVI_PAGE_SIZE") { cfg.page_size = parse_var("SUIVI_PAGE_SIZE", &v)?; }
        if let Some(v) = lookup("SUIVI_SESSION_TTL_SECS") { cfg.session_ttl_secs = parse_var("SUIVI_SESSION_TTL_SECS", &v)?; }
        if let Some(v) = lookup("SUIVI_SESSION_SECRET") { cfg.session_secret = Some(v); }
        if let Some(v) = lookup("SUIVI_COOKIE_NAME") { cfg.cookie_name = v; }
        if let Some(v) = lookup("SUIVI_COOKIE_SECURE") { cfg.cookie_secure = parse_var("SUIVI_COOKIE_SECURE", &v)?; }
        if let Some(v) = lookup("SUIVI_SEED_FILE") { cfg.seed_file = Some(v); }
        Ok(cfg)
    }

    pub fn table_defaults(&self) -> TableDefaults {
        TableDefaults { page_size: self.page_size, ..TableDefaults::default() }
    }
}

/// Global table settings applied to every resource unless overridden.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDefaults {
    pub page_size: usize,
    /// Case-insensitive search is the only mode the presenter supports today,
    /// but the flag lets a resource opt out of searching entirely.
    pub searchable: bool,
}

impl Default for TableDefaults {
    fn default() -> Self {
        Self { page_size: 10, searchable: true }
    }
}

/// Per-resource table overrides. Unspecified values inherit from `TableDefaults`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableOverride {
    pub page_size: Option<usize>,
    pub searchable: Option<bool>,
}

/// Fully resolved table settings used by the presenter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EffectiveTableConfig {
    pub page_size: usize,
    pub searchable: bool,
}

impl EffectiveTableConfig {
    /// Build effective settings from defaults + optional resource override.
    pub fn from_layers(defaults: &TableDefaults, ov: Option<&TableOverride>) -> Self {
        let page_size = ov.and_then(|o| o.page_size).unwrap_or(defaults.page_size).max(1);
        let searchable = ov.and_then(|o| o.searchable).unwrap_or(defaults.searchable);
        Self { page_size, searchable }
    }
}

impl Default for EffectiveTableConfig {
    fn default() -> Self {
        Self::from_layers(&TableDefaults::default(), None)
    }
}

/// Table settings for every resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableSettings {
    pub defaults: TableDefaults,
    #[serde(default)]
    pub overrides: HashMap<Resource, TableOverride>,
}

impl TableSettings {
    pub fn new(defaults: TableDefaults) -> Self {
        Self { defaults, overrides: HashMap::new() }
    }

    pub fn with_override(mut self, resource: Resource, ov: TableOverride) -> Self {
        self.overrides.insert(resource, ov);
        self
    }

    pub fn effective(&self, resource: Resource) -> EffectiveTableConfig {
        EffectiveTableConfig::from_layers(&self.defaults, self.overrides.get(&resource))
    }
}
