//! Schema introspection.

use crate::connection::DatabaseWrapper;
use crate::driver::{DbValue, Driver, ErrorOf};
use crate::error::{BackendError, Result};
use oxide_oracle_core::Params;

/// Lists tables owned by the connected user.
pub const TABLE_LIST_SQL: &str = "SELECT TABLE_NAME FROM USER_TABLES";

/// Lists sequences owned by the connected user.
pub const SEQUENCE_LIST_SQL: &str = "SELECT SEQUENCE_NAME FROM USER_SEQUENCES";

impl<D: Driver> DatabaseWrapper<D> {
    /// Names of the user's tables, lowercased.
    ///
    /// # Errors
    ///
    /// Returns any cursor error, or [`BackendError::UnexpectedValue`] for a
    /// non-text name.
    pub fn table_names(&mut self) -> Result<Vec<String>, ErrorOf<D>> {
        self.list_names(TABLE_LIST_SQL)
    }

    /// Names of the user's sequences, lowercased.
    ///
    /// # Errors
    ///
    /// Same as [`Self::table_names`].
    pub fn sequence_names(&mut self) -> Result<Vec<String>, ErrorOf<D>> {
        self.list_names(SEQUENCE_LIST_SQL)
    }

    fn list_names(&mut self, sql: &str) -> Result<Vec<String>, ErrorOf<D>> {
        let mut cursor = self.cursor()?;
        cursor.execute(sql, Params::none())?;
        cursor
            .fetchall()?
            .into_iter()
            .map(|row| match row.first() {
                Some(DbValue::Text(name)) => Ok(name.to_lowercase()),
                other => Err(BackendError::UnexpectedValue(format!(
                    "expected a name, got {other:?}"
                ))),
            })
            .collect()
    }
}
