//! Error types for the Oracle backend.

use oxide_oracle_core::DialectError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::driver::DriverError;

/// Errors raised by the backend.
///
/// Driver failures are carried unchanged in [`BackendError::Database`] or
/// [`BackendError::Integrity`] and display the driver's own message.
#[derive(Debug, Error)]
pub enum BackendError<E> {
    /// Missing or invalid connection settings. Raised before any network I/O.
    #[error("improperly configured: {0}")]
    Configuration(#[from] ConfigError),

    /// The connection has been closed.
    #[error("connection is not open")]
    NotConnected,

    /// The dialect cannot express the request.
    #[error(transparent)]
    Dialect(#[from] DialectError),

    /// Server capabilities stayed unknown after a discovery round trip.
    #[error("could not resolve server capabilities: {0}")]
    CapabilityDiscovery(String),

    /// A value read from the server had an unexpected shape.
    #[error("unexpected value from server: {0}")]
    UnexpectedValue(String),

    /// The driver rejected the request.
    #[error(transparent)]
    Database(E),

    /// The server reported a constraint violation.
    #[error(transparent)]
    Integrity(E),
}

impl<E: DriverError> BackendError<E> {
    /// Wraps a driver error, routing constraint violations to
    /// [`BackendError::Integrity`].
    pub fn from_driver(err: E) -> Self {
        if err.is_integrity_error() {
            Self::Integrity(err)
        } else {
            Self::Database(err)
        }
    }

    /// Returns the driver's error, if this is one.
    #[must_use]
    pub const fn driver_error(&self) -> Option<&E> {
        match self {
            Self::Database(e) | Self::Integrity(e) => Some(e),
            _ => None,
        }
    }

    /// Returns true for constraint violations.
    #[must_use]
    pub const fn is_integrity_error(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

/// Result type for backend operations against driver error `E`.
pub type Result<T, E> = std::result::Result<T, BackendError<E>>;
