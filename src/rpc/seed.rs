use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::info;

use super::{InMemoryRpc, Record};
use crate::identity::{SeedUser, UserDirectory};
use crate::permissions::Resource;

/// `{ "users": [...], "records": { "<resource>": [ {...}, ... ] } }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub records: HashMap<String, Vec<Record>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub records: usize,
}

pub async fn load_seed(path: &Path, rpc: &InMemoryRpc, users: &UserDirectory) -> Result<SeedSummary> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;

    let mut summary = SeedSummary::default();
    for u in seed.users.iter() {
        users.add_seed(u).with_context(|| format!("seeding user '{}'", u.id))?;
        summary.users += 1;
    }
    for (name, rows) in seed.records.into_iter() {
        let resource = Resource::parse(&name)
            .ok_or_else(|| anyhow!("seed file names unknown resource '{}'", name))?;
        summary.records += rows.len();
        rpc.insert_all(resource, rows).await;
    }
    info!(target: "startup", "seed loaded from {}: users={} records={}", path.display(), summary.users, summary.records);
    Ok(summary)
}
