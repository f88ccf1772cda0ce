//! Role-based capability evaluation for dashboard resources.

mod crud;
mod evaluator;
mod resource;

pub use crud::{Action, CrudPermissions};
pub use evaluator::{authorize, capabilities, define_permissions, permissions_for, record_scope, Decision, RecordScope};
pub use resource::Resource;
