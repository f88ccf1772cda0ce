use serde::{Deserialize, Serialize};

use crate::config::EffectiveTableConfig;
use crate::permissions::CrudPermissions;
use crate::rpc::{record_id, Record};

use super::column::{render_cell, ColumnDef};
use super::paginate::{clamp_page, page_count, page_slice};
use super::search::filter;
use super::sort::{sort_rows, SortSpec};

/// Columns and search configuration for one table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSpec {
    pub columns: Vec<ColumnDef>,
    pub search_field: String,
    #[serde(default)]
    pub additional_search_fields: Vec<String>,
}

/// What the user has typed/clicked. The page resets to 1 whenever the filter or
/// ordering changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableState {
    pub search: String,
    pub page: usize,
    pub sort: Option<SortSpec>,
}

impl Default for TableState {
    fn default() -> Self {
        Self { search: String::new(), page: 1, sort: None }
    }
}

impl TableState {
    /// Returns whether the (trimmed) query changed.
    pub fn set_search(&mut self, query: &str) -> bool {
        let q = query.trim();
        if q == self.search { return false; }
        self.search = q.to_string();
        self.page = 1;
        true
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        if self.sort != sort {
            self.sort = sort;
            self.page = 1;
        }
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowView {
    pub id: Option<String>,
    pub cells: Vec<String>,
    pub can_edit: bool,
    pub can_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "rows", rename_all = "snake_case")]
pub enum TableBody {
    Loading,
    Empty,
    Rows(Vec<RowView>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableView {
    pub columns: Vec<ColumnDef>,
    pub body: TableBody,
    pub search: String,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    /// Records before filtering
    pub total: usize,
    /// Records after filtering
    pub filtered: usize,
    pub show_add: bool,
}

impl TableView {
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            TableBody::Rows(r) => r,
            TableBody::Loading | TableBody::Empty => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.body, TableBody::Loading)
    }
}

fn sort_allowed(spec: &TableSpec, sort: &SortSpec) -> bool {
    spec.columns.iter().any(|c| c.sortable && c.key == sort.key)
}

/// Build the table view model. `None` data is an empty collection; while `pending`
/// the body is a loading placeholder. Edit/delete/add flags mirror `caps` exactly.
pub fn present(
    data: Option<&[Record]>,
    spec: &TableSpec,
    caps: &CrudPermissions,
    state: &TableState,
    cfg: &EffectiveTableConfig,
    pending: bool,
) -> TableView {
    let data = data.unwrap_or(&[]);
    let page_size = cfg.page_size.max(1);
    let mut view = TableView {
        columns: spec.columns.clone(),
        body: TableBody::Loading,
        search: state.search.clone(),
        page: 1,
        page_count: 0,
        page_size,
        total: data.len(),
        filtered: 0,
        show_add: caps.can_add,
    };
    if pending {
        view.total = 0;
        return view;
    }

    let query = if cfg.searchable { state.search.as_str() } else { "" };
    let mut rows = filter(data, query, &spec.search_field, &spec.additional_search_fields);
    if let Some(sort) = state.sort.as_ref().filter(|s| sort_allowed(spec, s)) {
        sort_rows(&mut rows, sort);
    }

    view.filtered = rows.len();
    view.page_count = page_count(rows.len(), page_size);
    view.page = clamp_page(state.page, view.page_count);
    let visible: Vec<RowView> = page_slice(&rows, view.page, page_size)
        .iter()
        .map(|r| RowView {
            id: record_id(r),
            cells: spec.columns.iter().map(|c| render_cell(r, &c.key)).collect(),
            can_edit: caps.can_edit,
            can_delete: caps.can_delete,
        })
        .collect();
    view.body = if visible.is_empty() { TableBody::Empty } else { TableBody::Rows(visible) };
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::sort::SortDirection;
    use serde_json::json;

    fn spec() -> TableSpec {
        TableSpec {
            columns: vec![ColumnDef::new("name", "Name").sortable(), ColumnDef::new("users.name", "People")],
            search_field: "name".into(),
            additional_search_fields: vec!["users.name".into()],
        }
    }

    fn cfg(page_size: usize) -> EffectiveTableConfig {
        EffectiveTableConfig { page_size, searchable: true }
    }

    fn dataset(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let name = if i % 2 == 0 { format!("Atelier {:02}", i) } else { format!("Groupe {:02}", i) };
                json!({"id": format!("r{}", i), "name": name, "users": [{"name": format!("user{}", i)}]})
                    .as_object()
                    .cloned()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn twenty_five_records_twelve_matches_two_pages() {
        // 25 records, 13 "Atelier" (even) names; drop one so the query hits 12
        let mut data = dataset(25);
        data.retain(|r| r["id"] != "r24");
        data.push(json!({"id": "extra", "name": "Other"}).as_object().cloned().unwrap());
        assert_eq!(data.len(), 25);

        let mut state = TableState::default();
        state.set_search("atelier");
        let v1 = present(Some(data.as_slice()), &spec(), &CrudPermissions::all(), &state, &cfg(10), false);
        assert_eq!(v1.filtered, 12);
        assert_eq!(v1.page_count, 2);
        assert_eq!(v1.rows().len(), 10);
        state.go_to(2);
        let v2 = present(Some(data.as_slice()), &spec(), &CrudPermissions::all(), &state, &cfg(10), false);
        assert_eq!(v2.rows().len(), 2);
        assert_eq!(v2.page, 2);
    }

    #[test]
    fn search_then_clear_restores_first_page_of_everything() {
        let data = dataset(23);
        let caps = CrudPermissions::all();
        let mut state = TableState::default();
        let original = present(Some(data.as_slice()), &spec(), &caps, &state, &cfg(10), false);

        state.go_to(3);
        assert!(state.set_search("user7"));
        assert_eq!(state.page, 1);
        let narrowed = present(Some(data.as_slice()), &spec(), &caps, &state, &cfg(10), false);
        assert_eq!(narrowed.filtered, 1);

        assert!(state.set_search(""));
        let restored = present(Some(data.as_slice()), &spec(), &caps, &state, &cfg(10), false);
        assert_eq!(restored, original);
        assert!(!state.set_search("  "));
    }

    #[test]
    fn capabilities_drive_affordances() {
        let data = dataset(3);
        let caps = CrudPermissions { can_list: true, can_details: true, can_add: false, can_edit: true, can_delete: false };
        let v = present(Some(data.as_slice()), &spec(), &caps, &TableState::default(), &cfg(10), false);
        assert!(!v.show_add);
        assert!(v.rows().iter().all(|r| r.can_edit && !r.can_delete));

        let empty = present(Some(&[][..]), &spec(), &caps, &TableState::default(), &cfg(10), false);
        assert!(!empty.show_add);
        assert_eq!(empty.body, TableBody::Empty);
    }

    #[test]
    fn undefined_and_pending_do_not_panic() {
        let caps = CrudPermissions::all();
        let v = present(None, &spec(), &caps, &TableState::default(), &cfg(10), false);
        assert_eq!(v.body, TableBody::Empty);
        assert_eq!(v.page_count, 0);
        assert_eq!(v.page, 1);

        let data = dataset(4);
        let loading = present(Some(data.as_slice()), &spec(), &caps, &TableState::default(), &cfg(10), true);
        assert!(loading.is_loading());
        assert!(loading.rows().is_empty());
    }

    #[test]
    fn sort_only_on_sortable_columns() {
        let data = dataset(5);
        let mut state = TableState::default();
        state.set_sort(Some(SortSpec { key: "name".into(), direction: SortDirection::Desc }));
        let v = present(Some(data.as_slice()), &spec(), &CrudPermissions::all(), &state, &cfg(10), false);
        assert_eq!(v.rows()[0].id.as_deref(), Some("r3"));

        state.set_sort(Some(SortSpec { key: "users.name".into(), direction: SortDirection::Desc }));
        let v = present(Some(data.as_slice()), &spec(), &CrudPermissions::all(), &state, &cfg(10), false);
        assert_eq!(v.rows()[0].id.as_deref(), Some("r0"));
    }

    #[test]
    fn page_past_the_end_is_clamped() {
        let data = dataset(12);
        let mut state = TableState::default();
        state.go_to(99);
        let v = present(Some(data.as_slice()), &spec(), &CrudPermissions::all(), &state, &cfg(5), false);
        assert_eq!(v.page, 3);
        assert_eq!(v.rows().len(), 2);
    }
}
