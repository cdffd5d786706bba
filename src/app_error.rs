//! Transport-neutral application errors for services that bind their
//! configuration with envfig.
//!
//! An [`AppError`] carries a coarse [`ErrorKind`] and a message; the kind
//! maps onto an HTTP status and a gRPC status code so handlers on either
//! transport report the same failure the same way.

use serde::Serialize;
use thiserror::Error;

use crate::error::EnvfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Invalid,
    InUse,
    NotFound,
    Unauthorized,
    Duplicated,
}

/// The gRPC status codes [`ErrorKind`] maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Unauthenticated,
}

impl RpcCode {
    /// Numeric code as defined by the gRPC status specification.
    pub fn code(self) -> i32 {
        match self {
            RpcCode::InvalidArgument => 3,
            RpcCode::NotFound => 5,
            RpcCode::AlreadyExists => 6,
            RpcCode::Unauthenticated => 16,
        }
    }
}

impl ErrorKind {
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Invalid => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::InUse | ErrorKind::Duplicated => 409,
        }
    }

    pub fn rpc_code(self) -> RpcCode {
        match self {
            ErrorKind::Invalid => RpcCode::InvalidArgument,
            ErrorKind::NotFound => RpcCode::NotFound,
            ErrorKind::Unauthorized => RpcCode::Unauthenticated,
            ErrorKind::InUse | ErrorKind::Duplicated => RpcCode::AlreadyExists,
        }
    }
}

/// An error a service reports to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn rpc_code(&self) -> RpcCode {
        self.kind.rpc_code()
    }

    /// `{"kind": "...", "message": "..."}`, for HTTP error bodies.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }
}

impl From<EnvfigError> for AppError {
    fn from(err: EnvfigError) -> Self {
        AppError::new(ErrorKind::Invalid, err.to_string())
    }
}
