//! Error handling primitives shared across the core.

use std::fmt::Display;

use thiserror::Error;

/// Stable error codes that cross the FFI boundary.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Dataset is missing one or more required columns.
    Schema = 1,
    /// Dataset has no rows to train on.
    EmptyDataset = 2,
    /// A column could not be encoded into numeric features.
    Encoding = 3,
    /// A cell or record could not be parsed.
    InvalidValue = 4,
    /// Prediction requested before any model was loaded.
    ModelUnavailable = 5,
    /// Artifact write or read failed.
    Persistence = 6,
    /// Catch-all for bugs and unexpected states.
    Internal = 7,
}

/// Canonical error type for the core.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HearthError {
    #[error("dataset is missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("dataset has no usable training rows ({rows} row(s) supplied)")]
    EmptyDataset { rows: usize },

    #[error("cannot encode column `{column}`: {reason}")]
    Encoding { column: String, reason: String },

    #[error("invalid value {value:?} for column `{column}` on line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("malformed dataset: {0}")]
    Malformed(String),

    #[error("no model has been loaded")]
    ModelUnavailable,

    #[error("artifact persistence failed: {0}")]
    Persistence(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias used throughout the crate.
pub type HearthResult<T> = Result<T, HearthError>;

impl HearthError {
    /// Machine parsable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            HearthError::Schema { .. } => ErrorCode::Schema,
            HearthError::EmptyDataset { .. } => ErrorCode::EmptyDataset,
            HearthError::Encoding { .. } => ErrorCode::Encoding,
            HearthError::InvalidValue { .. } | HearthError::Malformed(_) => {
                ErrorCode::InvalidValue
            }
            HearthError::ModelUnavailable => ErrorCode::ModelUnavailable,
            HearthError::Persistence(_) => ErrorCode::Persistence,
            HearthError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Encoding helper.
    pub fn encoding(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Persistence helper wrapping any displayable cause (io, bincode, tempfile).
    pub fn persistence(cause: impl Display) -> Self {
        Self::Persistence(cause.to_string())
    }

    /// Internal error helper.
    pub fn internal(cause: impl Display) -> Self {
        Self::Internal(cause.to_string())
    }
}
