use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rpc::Record;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDef {
    /// Field name or dotted path into nested fields, e.g. `users.name`
    pub key: String,
    pub header: String,
    #[serde(default)]
    pub sortable: bool,
}

impl ColumnDef {
    pub fn new(key: &str, header: &str) -> Self {
        Self { key: key.to_string(), header: header.to_string(), sortable: false }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

fn descend<'a>(v: &'a Value, seg: &str, out: &mut Vec<&'a Value>) {
    match v {
        Value::Object(m) => {
            if let Some(x) = m.get(seg) { out.push(x); }
        }
        Value::Array(items) => {
            for it in items { descend(it, seg, out); }
        }
        _ => {}
    }
}

fn flatten<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
    match v {
        Value::Array(items) => {
            for it in items { flatten(it, out); }
        }
        Value::Null => {}
        other => out.push(other),
    }
}

/// All non-null leaf values reached by a dotted path. Arrays fan out at every
/// step, so `users.name` over a list of users yields each name.
pub fn lookup_path<'a>(record: &'a Record, path: &str) -> Vec<&'a Value> {
    let mut segs = path.split('.');
    let Some(first) = segs.next() else { return Vec::new(); };
    let mut current: Vec<&Value> = record.get(first).into_iter().collect();
    for seg in segs {
        let mut next = Vec::new();
        for v in current { descend(v, seg, &mut next); }
        current = next;
    }
    let mut out = Vec::new();
    for v in current { flatten(v, &mut out); }
    out
}

pub fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Text shown in a cell; multiple leaves are joined with ", ".
pub fn render_cell(record: &Record, key: &str) -> String {
    lookup_path(record, key).into_iter().map(display_value).collect::<Vec<_>>().join(", ")
}
