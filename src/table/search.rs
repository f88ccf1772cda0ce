use crate::rpc::Record;

use super::column::{display_value, lookup_path};

/// Case-insensitive substring match on any leaf reached by the primary field or
/// any additional path. A blank query matches everything.
pub fn matches(record: &Record, query: &str, search_field: &str, additional: &[String]) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() { return true; }
    std::iter::once(search_field)
        .chain(additional.iter().map(|s| s.as_str()))
        .any(|path| lookup_path(record, path).into_iter().any(|v| display_value(v).to_lowercase().contains(&q)))
}

pub fn filter<'a>(data: &'a [Record], query: &str, search_field: &str, additional: &[String]) -> Vec<&'a Record> {
    data.iter().filter(|r| matches(r, query, search_field, additional)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rec(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn any_configured_field_may_match() {
        let r = rec(json!({"name": "Atelier bois", "users": [{"name": "Zoé Martin"}], "code": 1207}));
        let extra = vec!["users.name".to_string()];
        assert!(matches(&r, "ATELIER", "name", &extra));
        assert!(matches(&r, "martin", "name", &extra));
        assert!(!matches(&r, "martin", "name", &[]));
        assert!(matches(&r, "120", "code", &[]));
        assert!(matches(&r, "   ", "name", &[]));
        assert!(!matches(&r, "metal", "name", &extra));
    }
}
