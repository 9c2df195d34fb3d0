//! Error types for pagination operations.

use std::borrow::Cow;

use derive_builder::UninitializedFieldError;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Storage sources report their own error types; the paginator carries them
/// through this alias without knowing the concrete type.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Comprehensive error type for pagination operations.
///
/// Client-caused variants (malformed tokens or sort specifications) are
/// distinguished from configuration and storage failures by
/// [`Error::is_client_error`].
#[derive(Debug, thiserror::Error)]
#[must_use = "pagination errors should be handled appropriately"]
pub enum Error {
    /// The continuation token could not be decoded or references unknown fields.
    #[error("Invalid cursor: {0}")]
    InvalidCursor(Cow<'static, str>),

    /// The sort specification is malformed or names an unknown field.
    #[error("Invalid sorting: {0}")]
    InvalidSorting(Cow<'static, str>),

    /// The request carried no cursor or sorting and no usable default is configured.
    #[error("Invalid default cursor: no usable default cursor is configured")]
    InvalidDefaultCursor,

    /// A cursor token and a sort specification were supplied together.
    #[error("Cursor and sorting cannot be used at the same time")]
    CursorAndSortingTogether,

    /// The destination cannot hold a list of rows.
    #[error("Invalid find destination: {0}")]
    InvalidFindDestination(Cow<'static, str>),

    /// A required paginator component was never provided.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    /// The paginator or descriptor configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The storage source failed while fetching, counting or probing rows.
    #[error("Storage error: {0}")]
    Storage(#[source] BoxedError),
}

impl Error {
    /// Wraps a storage source failure.
    pub fn storage(error: impl Into<BoxedError>) -> Self {
        Self::Storage(error.into())
    }

    /// Returns whether this error was caused by client input.
    ///
    /// Client errors should be reported back to the caller (e.g. as HTTP 400);
    /// everything else is a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCursor(_) | Self::InvalidSorting(_) | Self::CursorAndSortingTogether
        )
    }

    /// Returns whether this error originates from the storage source.
    #[inline]
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<UninitializedFieldError> for Error {
    fn from(error: UninitializedFieldError) -> Self {
        Self::MissingConfiguration(error.field_name())
    }
}
