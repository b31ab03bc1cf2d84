//! Error types for Hangar core.

use std::{error::Error, fmt};

/// Error type for ship registry operations.
#[derive(Debug, Clone, PartialEq)]
pub enum HangarError {
    /// The ship identifier is not a positive integer.
    InvalidId(String),
    /// A provided field is out of range or otherwise malformed.
    InvalidField {
        /// Wire name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// The request body could not be decoded.
    Malformed(String),
    /// A create payload is missing required fields.
    Incomplete(Vec<&'static str>),
    /// A create payload carries no fields at all.
    Empty,
    /// No ship exists with the given identifier.
    NotFound(i64),
    /// The backing store failed.
    Store(String),
}

impl HangarError {
    /// Build an [`HangarError::InvalidField`] error.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// HTTP status code this error maps to at the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidId(_)
            | Self::InvalidField { .. }
            | Self::Malformed(_)
            | Self::Incomplete(_)
            | Self::Empty => 400,
            Self::NotFound(_) => 404,
            Self::Store(_) => 500,
        }
    }
}

impl fmt::Display for HangarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId(raw) => write!(f, "invalid ship id: {raw}"),
            Self::InvalidField { field, reason } => {
                write!(f, "incorrect value for field '{field}': {reason}")
            }
            Self::Malformed(message) => write!(f, "malformed request body: {message}"),
            Self::Incomplete(missing) => {
                write!(f, "missing required fields: {}", missing.join(", "))
            }
            Self::Empty => write!(f, "all fields are empty"),
            Self::NotFound(id) => write!(f, "ship not found (id: {id})"),
            Self::Store(message) => write!(f, "store error: {message}"),
        }
    }
}

impl Error for HangarError {}

/// Convenience result type for Hangar core.
pub type Result<T> = std::result::Result<T, HangarError>;
