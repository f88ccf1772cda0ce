use serde::{Deserialize, Serialize};

use crate::permissions::Resource;
use crate::table::{ColumnDef, TableSpec};

/// Everything that differs between one entity's pages and another's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceSpec {
    pub resource: Resource,
    pub title: String,
    pub table: TableSpec,
    /// Fields shown on the detail page, in order
    pub detail_fields: Vec<ColumnDef>,
}

impl ResourceSpec {
    pub fn new(resource: Resource, title: &str, search_field: &str) -> Self {
        Self {
            resource,
            title: title.to_string(),
            table: TableSpec { columns: Vec::new(), search_field: search_field.to_string(), additional_search_fields: Vec::new() },
            detail_fields: Vec::new(),
        }
    }

    pub fn column(mut self, col: ColumnDef) -> Self {
        self.detail_fields.push(col.clone());
        self.table.columns.push(col);
        self
    }

    /// Field shown on the detail page only.
    pub fn detail(mut self, key: &str, label: &str) -> Self {
        self.detail_fields.push(ColumnDef::new(key, label));
        self
    }

    pub fn also_search(mut self, path: &str) -> Self {
        self.table.additional_search_fields.push(path.to_string());
        self
    }
}
