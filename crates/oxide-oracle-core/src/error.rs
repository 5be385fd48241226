//! Error types for the Oracle dialect.

use thiserror::Error;

/// Errors raised while translating operations into Oracle SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    /// The connected server version lacks the requested feature.
    #[error("{feature} is not supported: {reason}")]
    Unsupported {
        /// Name of the feature that was requested.
        feature: &'static str,
        /// Why the feature is unavailable.
        reason: String,
    },

    /// The server version has not been discovered yet.
    #[error("capability '{0}' has not been resolved; open a connection first")]
    CapabilityUnresolved(&'static str),

    /// Lookup name not known to this dialect.
    #[error("unknown lookup type: {0}")]
    UnknownLookup(String),

    /// Date granularity not known to this dialect.
    #[error("unknown date granularity: {0}")]
    UnknownGranularity(String),

    /// A text value contains a character the target charset cannot represent.
    #[error("character {ch:?} cannot be encoded as {charset}")]
    Unencodable {
        /// Name of the target charset.
        charset: &'static str,
        /// First offending character.
        ch: char,
    },

    /// A time value could not be parsed.
    #[error("invalid time value '{0}', expected HH:MM:SS")]
    InvalidTime(String),
}

/// Result type alias for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;
