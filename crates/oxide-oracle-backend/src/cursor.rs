//! Cursor wrapper.
//!
//! Wraps a driver cursor so every statement goes through the same path:
//! terminators are stripped, parameters are marshalled into the connection
//! charset, and driver errors are classified without being rewritten.

use std::marker::PhantomData;

use oxide_oracle_core::params::{guess_input_sizes, marshal};
use oxide_oracle_core::{Charset, Params};
use tracing::debug;

use crate::driver::{DriverCursor, Row};
use crate::error::{BackendError, Result};

/// A statement handle borrowed from a [`crate::DatabaseWrapper`].
///
/// The lifetime ties the cursor to its connection, so it cannot outlive it.
pub struct Cursor<'conn, C: DriverCursor> {
    inner: C,
    charset: Charset,
    arraysize: usize,
    _conn: PhantomData<&'conn mut ()>,
}

impl<C: DriverCursor> std::fmt::Debug for Cursor<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("charset", &self.charset)
            .field("arraysize", &self.arraysize)
            .finish_non_exhaustive()
    }
}

impl<C: DriverCursor> Cursor<'_, C> {
    /// Wraps a fresh driver cursor. Numeric results are switched to strings so
    /// no precision is lost in driver-side float conversion.
    pub(crate) fn new(mut inner: C, charset: Charset, arraysize: usize) -> Self {
        inner.set_numbers_as_strings(true);
        Self {
            inner,
            charset,
            arraysize,
            _conn: PhantomData,
        }
    }

    /// Executes a statement.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Dialect`] if a parameter cannot be encoded, or
    /// the driver's error.
    pub fn execute(&mut self, sql: &str, params: Params) -> Result<(), C::Error> {
        let sql = normalize_statement(sql);
        let bound = marshal(params, self.charset)?;
        debug!(sql = %sql, params = bound.len(), "executing statement");
        self.inner
            .execute(sql, &bound)
            .map_err(BackendError::from_driver)
    }

    /// Executes a statement once per parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Dialect`] if a parameter cannot be encoded, or
    /// the driver's error.
    pub fn executemany(&mut self, sql: &str, batch: &[Params]) -> Result<(), C::Error> {
        let sql = normalize_statement(sql);
        let bound = batch
            .iter()
            .map(|params| marshal(params.clone(), self.charset))
            .collect::<oxide_oracle_core::Result<Vec<_>>>()?;
        let input_sizes = guess_input_sizes(&bound);
        debug!(sql = %sql, rows = bound.len(), "executing batch");
        self.inner
            .executemany(sql, &bound, input_sizes.as_ref())
            .map_err(BackendError::from_driver)
    }

    /// Fetches the next row, or `None` when the result set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub fn fetchone(&mut self) -> Result<Option<Row>, C::Error> {
        self.inner.fetchone().map_err(BackendError::from_driver)
    }

    /// Fetches up to `size` rows, defaulting to [`Self::arraysize`].
    ///
    /// An exhausted result set yields an empty `Vec`.
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<Row>, C::Error> {
        self.inner
            .fetchmany(size.unwrap_or(self.arraysize))
            .map_err(BackendError::from_driver)
    }

    /// Fetches all remaining rows.
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub fn fetchall(&mut self) -> Result<Vec<Row>, C::Error> {
        self.inner.fetchall().map_err(BackendError::from_driver)
    }

    /// Rows affected by the last statement, if the driver knows.
    #[must_use]
    pub fn rowcount(&self) -> Option<u64> {
        self.inner.rowcount()
    }

    /// Default `fetchmany` size.
    #[must_use]
    pub const fn arraysize(&self) -> usize {
        self.arraysize
    }

    /// Changes the default `fetchmany` size.
    pub fn set_arraysize(&mut self, arraysize: usize) {
        self.arraysize = arraysize;
    }
}

/// Strips SQL*Plus terminators the driver would reject.
///
/// A trailing `/` is always removed. A trailing `;` is removed from plain
/// statements but kept on PL/SQL units (anonymous blocks and stored program
/// definitions), whose final `END;` is part of the syntax.
///
/// ```rust
/// use oxide_oracle_backend::cursor::normalize_statement;
///
/// assert_eq!(normalize_statement("DELETE FROM \"T1\";"), "DELETE FROM \"T1\"");
/// assert_eq!(normalize_statement("BEGIN NULL; END;\n/"), "BEGIN NULL; END;");
/// ```
#[must_use]
pub fn normalize_statement(sql: &str) -> &str {
    let mut sql = sql.trim();
    if let Some(stripped) = sql.strip_suffix('/') {
        sql = stripped.trim_end();
    }
    if let Some(body) = sql.strip_suffix(';') {
        if !is_plsql_unit(body) {
            sql = body.trim_end();
        }
    }
    sql
}

/// `DECLARE ...`, `BEGIN ...` or `CREATE [OR REPLACE] TRIGGER|PROCEDURE|FUNCTION|PACKAGE ...`.
fn is_plsql_unit(sql: &str) -> bool {
    let mut words = sql.split_whitespace().map(str::to_ascii_uppercase);
    match words.next().as_deref() {
        Some("DECLARE" | "BEGIN") => true,
        Some("CREATE") => {
            let mut kind = words.next();
            if kind.as_deref() == Some("OR") {
                if words.next().as_deref() != Some("REPLACE") {
                    return false;
                }
                kind = words.next();
            }
            matches!(
                kind.as_deref(),
                Some("TRIGGER" | "PROCEDURE" | "FUNCTION" | "PACKAGE")
            )
        }
        _ => false,
    }
}
