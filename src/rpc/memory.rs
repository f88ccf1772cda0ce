use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{record_id, Filters, MutationOp, Record, RpcClient, RpcError};
use crate::permissions::Resource;

/// Process-local record store standing in for the remote backend.
#[derive(Default)]
pub struct InMemoryRpc {
    tables: RwLock<HashMap<Resource, Vec<Record>>>,
    failures: AtomicUsize,
}

impl InMemoryRpc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to a resource as-is (ids are not checked).
    pub async fn insert_all(&self, resource: Resource, records: Vec<Record>) {
        self.tables.write().await.entry(resource).or_default().extend(records);
    }

    pub async fn count(&self, resource: Resource) -> usize {
        self.tables.read().await.get(&resource).map(|t| t.len()).unwrap_or(0)
    }

    /// Make the next `n` calls fail with a transport error.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn position(table: &[Record], id: &str) -> Option<usize> {
    table.iter().position(|r| record_id(r).as_deref() == Some(id))
}

#[async_trait]
impl RpcClient for InMemoryRpc {
    async fn query(&self, resource: Resource, filters: &Filters) -> Result<Vec<Record>, RpcError> {
        if self.take_failure() {
            return Err(RpcError::Transport(format!("query {} failed", resource)));
        }
        let tables = self.tables.read().await;
        let rows = tables
            .get(&resource)
            .map(|t| t.iter().filter(|r| filters.matches(r)).cloned().collect())
            .unwrap_or_default();
        Ok(rows)
    }

    async fn mutate(&self, resource: Resource, op: MutationOp, payload: Record) -> Result<Record, RpcError> {
        if self.take_failure() {
            return Err(RpcError::Transport(format!("mutate {} failed", resource)));
        }
        let mut tables = self.tables.write().await;
        let table = tables.entry(resource).or_default();
        match op {
            MutationOp::Create => {
                let mut rec = payload;
                let id = match record_id(&rec) {
                    Some(id) => id,
                    None => {
                        let id = uuid::Uuid::new_v4().to_string();
                        rec.insert("id".into(), Value::String(id.clone()));
                        id
                    }
                };
                if position(table, &id).is_some() {
                    return Err(RpcError::Rejected(format!("{} record '{}' already exists", resource, id)));
                }
                table.push(rec.clone());
                Ok(rec)
            }
            MutationOp::Update { id } => {
                let Some(idx) = position(table, &id) else {
                    return Err(RpcError::NotFound { resource, id });
                };
                let target = &mut table[idx];
                for (k, v) in payload.into_iter() {
                    if k == "id" { continue; }
                    target.insert(k, v);
                }
                Ok(target.clone())
            }
            MutationOp::Delete { id } => {
                let Some(idx) = position(table, &id) else {
                    return Err(RpcError::NotFound { resource, id });
                };
                Ok(table.remove(idx))
            }
        }
    }
}
