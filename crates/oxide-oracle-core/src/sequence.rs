//! Auto-increment emulation with sequences and triggers.
//!
//! Oracle (before 12c) has no auto-increment columns. Every auto primary key gets
//! a sequence named `<TABLE>_SQ` and a `BEFORE INSERT` trigger named
//! `<TABLE>_TR` that fills the column from the sequence when it is NULL.
//!
//! The generated PL/SQL blocks end with a SQL*Plus `/` terminator; the cursor
//! strips it before execution.

use crate::naming::{quote_name, sequence_name, trigger_name};
use crate::style::SqlStyle;

/// Column assumed when a sequence entry names none.
pub const DEFAULT_PK_COLUMN: &str = "id";

/// The two statements that set up auto-increment for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoincSql {
    /// Creates the sequence unless it already exists.
    pub sequence: String,
    /// Creates or replaces the insert trigger.
    pub trigger: String,
}

impl AutoincSql {
    /// Returns the statements in execution order.
    #[must_use]
    pub fn into_statements(self) -> [String; 2] {
        [self.sequence, self.trigger]
    }
}

/// A sequence to reset after flushing, identified by its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceInfo {
    /// Table owning the sequence.
    pub table: String,
    /// Auto-increment column; [`DEFAULT_PK_COLUMN`] when absent.
    pub column: Option<String>,
}

impl SequenceInfo {
    /// Creates a sequence entry for `table` and `column`.
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: Some(column.into()),
        }
    }

    /// Creates a sequence entry using the default primary-key column.
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: None,
        }
    }

    fn column(&self) -> &str {
        self.column.as_deref().unwrap_or(DEFAULT_PK_COLUMN)
    }
}

/// What the sequence manager needs to know about a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelMeta {
    /// The model's table.
    pub db_table: String,
    /// Column of the model's auto primary key, if it has one.
    pub auto_field: Option<String>,
    /// Join tables of the model's many-to-many fields.
    pub many_to_many_tables: Vec<String>,
}

/// Builds the sequence and trigger statements for `table.column`.
///
/// The sequence block checks `USER_CATALOG` first, so running schema setup
/// twice does not fail on the existing sequence.
#[must_use]
pub fn autoinc_sql(table: &str, column: &str) -> AutoincSql {
    let sq_name = sequence_name(table);
    let tr_name = trigger_name(table);
    let tbl_name = quote_name(table);
    let col_name = quote_name(column);

    let sequence = format!(
        "
DECLARE
    i INTEGER;
BEGIN
    SELECT COUNT(*) INTO i FROM USER_CATALOG
        WHERE TABLE_NAME = '{sq_name}' AND TABLE_TYPE = 'SEQUENCE';
    IF i = 0 THEN
        EXECUTE IMMEDIATE 'CREATE SEQUENCE {sq_name}';
    END IF;
END;
/"
    );
    let trigger = format!(
        "
CREATE OR REPLACE TRIGGER {tr_name}
BEFORE INSERT ON {tbl_name}
FOR EACH ROW
WHEN (new.{col_name} IS NULL)
    BEGIN
        SELECT {sq_name}.nextval
        INTO :new.{col_name} FROM dual;
    END;
/"
    );
    AutoincSql { sequence, trigger }
}

/// Builds the block that moves the sequence of `table` past `MAX(column)`.
///
/// The table is locked in share mode so concurrent readers are unaffected.
/// When the sequence is already in step nothing is altered; otherwise the
/// increment is set to the gap, one value is drawn, and the increment is
/// restored to 1 inside the same branch.
#[must_use]
pub fn sequence_reset_statement(table: &str, column: &str) -> String {
    let sequence = sequence_name(table);
    let table = quote_name(table);
    let column = quote_name(column);
    format!(
        "
DECLARE
    startvalue integer;
    cval integer;
BEGIN
    LOCK TABLE {table} IN SHARE MODE;
    SELECT NVL(MAX({column}), 0) INTO startvalue FROM {table};
    SELECT {sequence}.nextval INTO cval FROM dual;
    cval := startvalue - cval;
    IF cval != 0 THEN
        EXECUTE IMMEDIATE 'ALTER SEQUENCE {sequence} MINVALUE 0 INCREMENT BY '||cval;
        SELECT {sequence}.nextval INTO cval FROM dual;
        EXECUTE IMMEDIATE 'ALTER SEQUENCE {sequence} INCREMENT BY 1';
    END IF;
    COMMIT;
END;
/"
    )
}

/// Statements that empty `tables` and then reset `sequences`.
///
/// Rows are removed with `DELETE FROM` rather than `TRUNCATE`, which trips
/// over enabled foreign keys. Returns nothing when `tables` is empty.
#[must_use]
pub fn sql_flush<S: SqlStyle + ?Sized>(
    style: &S,
    tables: &[&str],
    sequences: &[SequenceInfo],
) -> Vec<String> {
    if tables.is_empty() {
        return Vec::new();
    }
    let mut sql: Vec<String> = tables
        .iter()
        .map(|table| {
            format!(
                "{} {} {};",
                style.keyword("DELETE"),
                style.keyword("FROM"),
                style.field(&quote_name(table))
            )
        })
        .collect();
    sql.extend(
        sequences
            .iter()
            .map(|seq| sequence_reset_statement(&seq.table, seq.column())),
    );
    sql
}

/// Reset statements for the auto primary key and many-to-many tables of each
/// model.
#[must_use]
pub fn sequence_reset_sql<S: SqlStyle + ?Sized>(_style: &S, models: &[ModelMeta]) -> Vec<String> {
    let mut output = Vec::new();
    for model in models {
        if let Some(column) = &model.auto_field {
            output.push(sequence_reset_statement(&model.db_table, column));
        }
        for table in &model.many_to_many_tables {
            output.push(sequence_reset_statement(table, DEFAULT_PK_COLUMN));
        }
    }
    output
}

/// Drops the sequence of `table`.
#[must_use]
pub fn drop_sequence_sql(table: &str) -> String {
    format!("DROP SEQUENCE {};", quote_name(&sequence_name(table)))
}
