use serde::{Deserialize, Serialize};

/// One of the five affordances a page can offer on a resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    List,
    Details,
    Add,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [Action::List, Action::Details, Action::Add, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Details => "details",
            Action::Add => "add",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

/// Capability set for one (permission, resource) pair. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct CrudPermissions {
    pub can_list: bool,
    pub can_details: bool,
    pub can_add: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl CrudPermissions {
    pub const fn none() -> Self {
        Self { can_list: false, can_details: false, can_add: false, can_edit: false, can_delete: false }
    }

    pub const fn all() -> Self {
        Self { can_list: true, can_details: true, can_add: true, can_edit: true, can_delete: true }
    }

    /// Build from a compact flag string such as `"LDAE"` (list, details, add, edit, delete = `X`).
    pub(crate) const fn from_flags(flags: &str) -> Self {
        let b = flags.as_bytes();
        let mut out = Self::none();
        let mut i = 0;
        while i < b.len() {
            match b[i] {
                b'L' => out.can_list = true,
                b'D' => out.can_details = true,
                b'A' => out.can_add = true,
                b'E' => out.can_edit = true,
                b'X' => out.can_delete = true,
                _ => {}
            }
            i += 1;
        }
        out
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::List => self.can_list,
            Action::Details => self.can_details,
            Action::Add => self.can_add,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
        }
    }

    pub fn is_subset_of(&self, other: &CrudPermissions) -> bool {
        Action::ALL.iter().all(|a| !self.allows(*a) || other.allows(*a))
    }

    pub fn is_empty(&self) -> bool {
        !Action::ALL.iter().any(|a| self.allows(*a))
    }
}
