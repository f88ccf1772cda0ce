//! Generic searchable, sortable, paginated table view model with capability gating.

mod column;
mod gate;
mod paginate;
mod presenter;
mod search;
mod sort;

pub use column::{display_value, lookup_path, render_cell, ColumnDef};
pub use gate::ActionGate;
pub use paginate::{clamp_page, page_count, page_slice};
pub use presenter::{present, RowView, TableBody, TableSpec, TableState, TableView};
pub use search::{filter, matches};
pub use sort::{sort_rows, SortDirection, SortSpec};
