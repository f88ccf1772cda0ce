use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lifecycle of one view: `Loading -> Populated | Empty | Error`. A retry goes back to `Loading`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    Loading,
    Populated(T),
    Empty,
    Error { code: String, message: String, retryable: bool },
}

impl<T> ViewState<T> {
    pub fn error(err: &AppError) -> Self {
        ViewState::Error { code: err.code_str().to_string(), message: err.message().to_string(), retryable: err.is_retryable() }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ViewState::Loading)
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            ViewState::Populated(v) => Some(v),
            _ => None,
        }
    }
}
