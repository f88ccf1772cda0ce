use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rpc::Record;

use super::column::{display_value, lookup_path};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

fn sort_key<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
    lookup_path(record, key).into_iter().next()
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => display_value(a).to_lowercase().cmp(&display_value(b).to_lowercase()),
    }
}

/// Stable sort; rows without a value for the key go last in either direction.
pub fn sort_rows(rows: &mut [&Record], spec: &SortSpec) {
    rows.sort_by(|a, b| match (sort_key(a, &spec.key), sort_key(b, &spec.key)) {
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            match spec.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::record_id;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    fn ids(rows: &[&Record]) -> Vec<String> {
        rows.iter().filter_map(|r| record_id(r)).collect()
    }

    #[test]
    fn numeric_and_textual_with_missing_last() {
        let data = vec![
            rec(json!({"id": "a", "n": 10, "name": "bravo"})),
            rec(json!({"id": "b", "n": 9, "name": "Alpha"})),
            rec(json!({"id": "c"})),
            rec(json!({"id": "d", "n": 100, "name": "charlie"})),
        ];
        let mut rows: Vec<&Record> = data.iter().collect();
        sort_rows(&mut rows, &SortSpec { key: "n".into(), direction: SortDirection::Asc });
        assert_eq!(ids(&rows), vec!["b", "a", "d", "c"]);
        sort_rows(&mut rows, &SortSpec { key: "name".into(), direction: SortDirection::Desc });
        assert_eq!(ids(&rows), vec!["d", "a", "b", "c"]);
    }
}
