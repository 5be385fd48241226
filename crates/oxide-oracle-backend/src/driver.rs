//! The driver seam.
//!
//! The wire protocol is out of scope for this crate. A driver crate (a JDBC
//! bridge, an OCI binding, a test double) implements these traits and the
//! backend drives it. All calls are blocking.

use chrono::NaiveDateTime;
use oxide_oracle_core::{BoundParams, InputSizes};

/// A value read back from the server.
///
/// Cursors run with numbers-as-strings enabled, so numeric columns arrive as
/// [`DbValue::Number`] holding the exact decimal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbValue {
    /// SQL NULL.
    Null,
    /// Character data.
    Text(String),
    /// Numeric data as exact decimal text.
    Number(String),
    /// Raw or LOB binary data.
    Bytes(Vec<u8>),
    /// Date or timestamp.
    Timestamp(NaiveDateTime),
}

impl DbValue {
    /// Returns the value as an integer, if it is a number or numeric text.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(s) | Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the textual content of text and number values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One result row.
pub type Row = Vec<DbValue>;

/// Errors raised by a driver.
///
/// The backend never rewrites these. It only asks whether the error is a
/// constraint violation so it can be surfaced as an integrity error.
pub trait DriverError: std::error::Error + Send + Sync + 'static {
    /// Returns true if the server rejected the statement for violating a
    /// constraint.
    fn is_integrity_error(&self) -> bool {
        false
    }
}

/// A low-level statement handle.
pub trait DriverCursor {
    /// The driver's error type.
    type Error: DriverError;

    /// Executes one statement with bound parameters.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn execute(&mut self, sql: &str, params: &BoundParams) -> Result<(), Self::Error>;

    /// Executes one statement once per parameter set.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn executemany(
        &mut self,
        sql: &str,
        batch: &[BoundParams],
        input_sizes: Option<&InputSizes>,
    ) -> Result<(), Self::Error>;

    /// Fetches the next row.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn fetchone(&mut self) -> Result<Option<Row>, Self::Error>;

    /// Fetches up to `size` rows.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn fetchmany(&mut self, size: usize) -> Result<Vec<Row>, Self::Error>;

    /// Fetches all remaining rows.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn fetchall(&mut self) -> Result<Vec<Row>, Self::Error>;

    /// Makes numeric columns arrive as decimal strings.
    fn set_numbers_as_strings(&mut self, enabled: bool);

    /// Rows affected by the last statement, if known.
    fn rowcount(&self) -> Option<u64>;
}

/// A live session to the server.
pub trait DriverConnection {
    /// The driver's error type.
    type Error: DriverError;
    /// The cursor type handed out by this connection.
    type Cursor: DriverCursor<Error = Self::Error>;

    /// Opens a new cursor.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn cursor(&mut self) -> Result<Self::Cursor, Self::Error>;

    /// Sets the statement cache size. Older drivers may not support it.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when the setting is unavailable.
    fn set_statement_cache_size(&mut self, size: u32) -> Result<(), Self::Error>;

    /// Returns the server's version string or banner.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn server_version(&mut self) -> Result<String, Self::Error>;

    /// Closes the session.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// Entry point of a driver.
pub trait Driver {
    /// The connection type produced by [`Driver::connect`].
    type Connection: DriverConnection;

    /// Opens a session.
    ///
    /// # Errors
    ///
    /// Returns the driver's error unchanged.
    fn connect(
        &self,
        dsn: &str,
        user: &str,
        password: &str,
    ) -> Result<Self::Connection, ErrorOf<Self>>;
}

/// Error type of driver `D`.
pub type ErrorOf<D> = <<D as Driver>::Connection as DriverConnection>::Error;

/// Cursor type of driver `D`.
pub type CursorOf<D> = <<D as Driver>::Connection as DriverConnection>::Cursor;
