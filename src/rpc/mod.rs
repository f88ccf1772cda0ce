//! Data-fetching collaborator: the interface views call to read and mutate records,
//! plus an in-memory backend used by the server binary and tests.

mod memory;
mod seed;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::permissions::Resource;

pub use memory::InMemoryRpc;
pub use seed::{load_seed, SeedFile, SeedSummary};

/// Records are opaque bags of named fields; only columns and search paths look inside.
pub type Record = serde_json::Map<String, Value>;

/// Record id as a string; numeric ids are rendered in decimal.
pub fn record_id(record: &Record) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Ordered equality constraints applied by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<(String, Value)>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq<K: Into<String>, V: Into<Value>>(mut self, field: K, value: V) -> Self {
        self.0.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All constraints hold. A numeric field compares equal to its decimal string form.
    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(field, want)| match record.get(field) {
            Some(have) if have == want => true,
            Some(Value::Number(n)) => want.as_str() == Some(n.to_string().as_str()),
            _ => false,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOp {
    Create,
    Update { id: String },
    Delete { id: String },
}

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("{resource} record '{id}' not found")]
    NotFound { resource: Resource, id: String },
    #[error("payload rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn query(&self, resource: Resource, filters: &Filters) -> Result<Vec<Record>, RpcError>;
    async fn mutate(&self, resource: Resource, op: MutationOp, payload: Record) -> Result<Record, RpcError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn record_id_accepts_strings_and_numbers() {
        assert_eq!(record_id(&rec(json!({"id": "a1"}))), Some("a1".into()));
        assert_eq!(record_id(&rec(json!({"id": 42}))), Some("42".into()));
        assert_eq!(record_id(&rec(json!({"name": "x"}))), None);
    }

    #[test]
    fn filters_require_every_constraint() {
        let r = rec(json!({"id": 7, "member_id": "u1", "team": "blue"}));
        assert!(Filters::new().matches(&r));
        assert!(Filters::new().eq("member_id", "u1").matches(&r));
        assert!(Filters::new().eq("id", "7").matches(&r));
        assert!(!Filters::new().eq("member_id", "u1").eq("team", "red").matches(&r));
        assert!(!Filters::new().eq("missing", "x").matches(&r));
    }
}
