//! Per-resource page logic: resolve capabilities, fetch through the RPC client,
//! hand rows to the table presenter, and gate every action.

mod controller;
mod registry;
mod spec;
mod state;
mod tracker;

pub use controller::{DetailField, DetailOutcome, DetailView, ListOutcome, Redirects, ResourceController};
pub use registry::{all_specs, resource_spec};
pub use spec::ResourceSpec;
pub use state::ViewState;
pub use tracker::{Ticket, ViewTracker};
