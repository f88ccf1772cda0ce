//! Unified application error model.
//! Every layer (session, permissions, views, HTTP) reports failures through `AppError`,
//! which carries a stable machine code plus a human message and maps onto HTTP.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::rpc::RpcError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// No valid session. Callers route to the login/guest view.
    Unauthenticated { code: String, message: String },
    /// Valid session, insufficient capability.
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    /// Network/RPC failure; the view renders an inline, retryable error.
    TransientFetch { code: String, message: String },
    /// Unknown resource or similar wiring mistake. Logged, never fatal.
    Configuration { code: String, message: String },
    UserInput { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Unauthenticated { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::TransientFetch { code, .. }
            | AppError::Configuration { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthenticated { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::TransientFetch { message, .. }
            | AppError::Configuration { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn unauthenticated<S: Into<String>>(code: S, msg: S) -> Self { AppError::Unauthenticated { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn transient<S: Into<String>>(code: S, msg: S) -> Self { AppError::TransientFetch { code: code.into(), message: msg.into() } }
    pub fn configuration<S: Into<String>>(code: S, msg: S) -> Self { AppError::Configuration { code: code.into(), message: msg.into() } }
    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(code: S, msg: S) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::Unauthenticated { .. } => 401,
            AppError::Forbidden { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::TransientFetch { .. } => 503,
            AppError::Configuration { .. } => 500,
            AppError::UserInput { .. } => 400,
            AppError::Internal { .. } => 500,
        }
    }

    /// Only fetch failures are worth retrying; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::TransientFetch { .. })
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal_error".into(), message: err.to_string() }
    }
}

impl From<RpcError> for AppError {
    fn from(err: RpcError) -> Self {
        let message = err.to_string();
        match err {
            RpcError::Transport(_) => AppError::TransientFetch { code: "fetch_failed".into(), message },
            RpcError::NotFound { .. } => AppError::NotFound { code: "record_not_found".into(), message },
            RpcError::Rejected(_) => AppError::UserInput { code: "payload_rejected".into(), message },
        }
    }
}
