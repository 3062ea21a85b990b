//! Error types for cursor pagination.
//!
//! Argument and cursor errors are raised while a [`crate::PaginationEngine`]
//! is being built, before the data source is touched. Data source errors are
//! carried through unchanged.

use crate::value::ValueKind;

/// Message for the `first` + `last` exclusivity violation. Part of the public contract.
pub const FIRST_AND_LAST_MESSAGE: &str = "first and last must not be included at the same time";

/// Unified error type for pagination operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("malformed cursor: {0}")]
    MalformedCursor(#[from] CursorError),

    #[error("row has no value for sort field `{0}`")]
    MissingSortField(String),

    #[error(transparent)]
    DataSource(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    pub(crate) fn first_and_last() -> Self {
        Error::InvalidArgument(FIRST_AND_LAST_MESSAGE.to_owned())
    }

    /// Wrap an error returned by an [`crate::OrderedQueryExecutor`].
    pub fn data_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::DataSource(Box::new(err))
    }

    /// Borrow the data source error as its concrete type, if it is one.
    #[must_use]
    pub fn downcast_data_source<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::DataSource(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

/// Reasons a cursor token fails to decode.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("invalid base64url encoding")]
    InvalidBase64,

    #[error("malformed payload")]
    InvalidJson,

    #[error("unsupported version {0}")]
    UnsupportedVersion(u8),

    #[error("empty key")]
    EmptyKey,

    #[error("unsupported type marker `{0}`")]
    UnknownKind(String),

    #[error("invalid {0} value")]
    InvalidValue(ValueKind),

    #[error("expected {expected} key components, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    #[error("key component {index} is {got}, expected {expected}")]
    KindMismatch {
        index: usize,
        expected: ValueKind,
        got: ValueKind,
    },
}
