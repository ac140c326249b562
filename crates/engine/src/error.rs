//! The module contains the errors the engine can throw.
//!
//! Every variant maps onto a stable [`ErrorKind`], so callers can branch on
//! the failure without reading the message:
//!
//! - [`Validation`] missing or malformed payload fields, unknown entry mode.
//! - [`KeyNotFound`] a referenced user, vehicle or refueling does not exist.
//! - [`Unauthorized`] the actor lacks the capability for the mutation.
//! - [`ExistingKey`] a username or license plate is already taken.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`ExistingKey`]: EngineError::ExistingKey
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(DbErr),
}

/// Stable classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// Identifier a transport layer can forward as-is.
    pub fn code(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::ExistingKey(_) => ErrorKind::Conflict,
            Self::InvalidId(_) | Self::Database(_) => ErrorKind::Internal,
        }
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        // Unique indexes back the username and license plate constraints.
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return Self::ExistingKey(detail);
        }
        Self::Database(err)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
