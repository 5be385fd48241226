//! Dialect translation.
//!
//! [`DatabaseOperations`] maps abstract ORM operations to SQL fragments and
//! [`OracleOperations`] implements it for Oracle. Fragments use `%s` as the
//! placeholder for the operand the ORM substitutes later.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{DialectError, Result};
use crate::lookup::{DateGranularity, LookupType};
use crate::naming::{self, MAX_NAME_LENGTH};
use crate::sequence::{self, AutoincSql, ModelMeta, SequenceInfo};
use crate::style::SqlStyle;
use crate::version::ServerVersion;

macro_rules! nls_date_format {
    () => {
        "YYYY-MM-DD"
    };
}

macro_rules! nls_timestamp_format {
    () => {
        "YYYY-MM-DD HH24:MI:SS.FF"
    };
}

/// Session `NLS_DATE_FORMAT`.
pub const DATE_FORMAT: &str = nls_date_format!();

/// Session `NLS_TIMESTAMP_FORMAT`; also used by [`DatabaseOperations::datetime_cast_sql`].
pub const TIMESTAMP_FORMAT: &str = nls_timestamp_format!();

/// Statement run once on every new connection.
pub const SESSION_INIT_SQL: &str = concat!(
    "ALTER SESSION SET NLS_DATE_FORMAT = '",
    nls_date_format!(),
    "' NLS_TIMESTAMP_FORMAT = '",
    nls_timestamp_format!(),
    "'"
);

/// chrono equivalent of [`TIMESTAMP_FORMAT`] for writing values.
const CHRONO_TIMESTAMP_WRITE: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// chrono equivalent of [`TIMESTAMP_FORMAT`] for reading values.
const CHRONO_TIMESTAMP_READ: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Formats a timestamp the way the session prints `TIMESTAMP` values.
#[must_use]
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(CHRONO_TIMESTAMP_WRITE).to_string()
}

/// Parses a timestamp printed in the session format.
///
/// # Errors
///
/// Returns the chrono parse error when `text` does not match the format.
pub fn parse_timestamp(text: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, CHRONO_TIMESTAMP_READ)
}

/// A time value handed to [`DatabaseOperations::value_to_db_time`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeInput {
    /// A parsed time of day.
    Time(NaiveTime),
    /// A `HH:MM:SS` string.
    Text(String),
}

impl TimeInput {
    fn to_time(&self) -> Result<NaiveTime> {
        match self {
            Self::Time(t) => Ok(*t),
            Self::Text(s) => NaiveTime::parse_from_str(s, "%H:%M:%S")
                .map_err(|_| DialectError::InvalidTime(s.clone())),
        }
    }
}

/// Translates abstract operations into engine SQL.
///
/// Only [`Self::prep_lookup_value`] and [`Self::date_extract_sql`] have
/// defaults; everything else is engine specific.
pub trait DatabaseOperations {
    /// Returns the engine name.
    fn name(&self) -> &'static str;

    /// Maximum identifier length, if the engine limits it.
    fn max_name_length(&self) -> Option<usize>;

    /// Quotes an identifier.
    fn quote_name(&self, name: &str) -> String;

    /// Returns the operator template for a lookup.
    ///
    /// # Errors
    ///
    /// Regex lookups fail as described on [`Self::regex_lookup`].
    fn lookup_operator(&self, lookup: LookupType) -> Result<Cow<'static, str>>;

    /// Template applied to the column side of a lookup.
    fn lookup_cast(&self, lookup: LookupType) -> &'static str;

    /// Prepares the value bound for a pattern lookup.
    fn prep_lookup_value(&self, lookup: LookupType, value: &str) -> String {
        lookup.prep_pattern(value)
    }

    /// Prepares the value bound for an `iexact` lookup.
    fn prep_for_iexact_query(&self, value: &str) -> String;

    /// Truncates a date expression to `granularity`.
    fn date_trunc_sql(&self, granularity: DateGranularity, field: &str) -> String;

    /// Extracts `unit` from a date expression.
    fn date_extract_sql(&self, unit: DateGranularity, field: &str) -> String {
        format!("EXTRACT({} FROM {field})", unit.as_str().to_uppercase())
    }

    /// Template casting a bound string to a timestamp.
    fn datetime_cast_sql(&self) -> String;

    /// Name of the random-value function used for random ordering.
    fn random_function_sql(&self) -> &'static str;

    /// Template for a regex lookup.
    ///
    /// # Errors
    ///
    /// Fails when the engine cannot match regular expressions, or does not
    /// know yet whether it can.
    fn regex_lookup(&self, lookup: LookupType) -> Result<Cow<'static, str>>;

    /// Template for reading a column of type `db_type` in a comparison.
    fn field_cast_sql(&self, db_type: &str) -> &'static str;

    /// Suffix making a foreign key deferrable.
    fn deferrable_sql(&self) -> &'static str;

    /// Statement that starts a transaction.
    fn start_transaction_sql(&self) -> &'static str;

    /// Tablespace clause, if the engine has tablespaces.
    fn tablespace_sql(&self, tablespace: &str, inline: bool) -> Option<String>;

    /// Statements that emulate auto-increment for `table.column`.
    fn autoinc_sql(&self, table: &str, column: &str) -> Option<AutoincSql>;

    /// Statement that resynchronises the sequence of `table.column`.
    fn sequence_reset_statement(&self, table: &str, column: &str) -> Option<String>;

    /// Statements that empty `tables` and reset `sequences`.
    fn sql_flush(
        &self,
        style: &dyn SqlStyle,
        tables: &[&str],
        sequences: &[SequenceInfo],
    ) -> Vec<String>;

    /// Sequence reset statements for the given models.
    fn sequence_reset_sql(&self, style: &dyn SqlStyle, models: &[ModelMeta]) -> Vec<String>;

    /// Statement dropping the sequence of `table`.
    fn drop_sequence_sql(&self, table: &str) -> Option<String>;

    /// Query returning the last id inserted into `table`.
    fn last_insert_id_sql(&self, table: &str, pk_name: &str) -> Option<String>;

    /// Converts a time for binding to a time column. Engines without a TIME
    /// type return it as a timestamp on a fixed date.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::InvalidTime`] for unparsable text.
    fn value_to_db_time(&self, value: Option<&TimeInput>) -> Result<Option<NaiveDateTime>>;

    /// Inclusive bounds for a `__year` lookup on a date column.
    fn year_lookup_bounds_for_date_field(&self, year: i32) -> [String; 2];
}

/// What is known about the server's regex support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegexSupport {
    /// No connection has reported a version yet.
    #[default]
    Unresolved,
    /// The server predates `REGEXP_LIKE`.
    Unsupported(ServerVersion),
    /// The server has `REGEXP_LIKE`.
    Supported(ServerVersion),
}

impl RegexSupport {
    /// Derives regex support from a server version.
    #[must_use]
    pub const fn from_version(version: ServerVersion) -> Self {
        if version.supports_regex() {
            Self::Supported(version)
        } else {
            Self::Unsupported(version)
        }
    }
}

/// Oracle implementation of [`DatabaseOperations`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleOperations {
    regex: RegexSupport,
}

impl OracleOperations {
    /// Creates operations with unresolved server capabilities.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regex: RegexSupport::Unresolved,
        }
    }

    /// Creates operations for a known server version.
    #[must_use]
    pub const fn with_version(version: ServerVersion) -> Self {
        Self {
            regex: RegexSupport::from_version(version),
        }
    }

    /// Records the server version reported by a fresh connection.
    pub fn resolve(&mut self, version: ServerVersion) {
        self.regex = RegexSupport::from_version(version);
    }

    /// Returns the current regex capability.
    #[must_use]
    pub const fn regex_support(&self) -> RegexSupport {
        self.regex
    }

    /// Returns the server version, once resolved.
    #[must_use]
    pub const fn server_version(&self) -> Option<ServerVersion> {
        match self.regex {
            RegexSupport::Unresolved => None,
            RegexSupport::Unsupported(v) | RegexSupport::Supported(v) => Some(v),
        }
    }
}

impl DatabaseOperations for OracleOperations {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn max_name_length(&self) -> Option<usize> {
        Some(MAX_NAME_LENGTH)
    }

    fn quote_name(&self, name: &str) -> String {
        naming::quote_name(name)
    }

    fn lookup_operator(&self, lookup: LookupType) -> Result<Cow<'static, str>> {
        let op = match lookup {
            LookupType::Exact => "= %s",
            LookupType::IExact => "= UPPER(%s)",
            LookupType::Contains | LookupType::StartsWith | LookupType::EndsWith => {
                "LIKEC %s ESCAPE '\\'"
            }
            LookupType::IContains | LookupType::IStartsWith | LookupType::IEndsWith => {
                "LIKEC UPPER(%s) ESCAPE '\\'"
            }
            LookupType::Gt => "> %s",
            LookupType::Gte => ">= %s",
            LookupType::Lt => "< %s",
            LookupType::Lte => "<= %s",
            LookupType::In => "IN (%s)",
            LookupType::Range => "BETWEEN %s AND %s",
            LookupType::IsNull => "IS NULL",
            LookupType::Regex | LookupType::IRegex => return self.regex_lookup(lookup),
        };
        Ok(Cow::Borrowed(op))
    }

    fn lookup_cast(&self, lookup: LookupType) -> &'static str {
        if lookup.is_case_insensitive() && !lookup.is_regex() {
            "UPPER(%s)"
        } else {
            "%s"
        }
    }

    fn prep_for_iexact_query(&self, value: &str) -> String {
        value.to_string()
    }

    fn date_trunc_sql(&self, granularity: DateGranularity, field: &str) -> String {
        // TRUNC works on dates and numbers alike; without a format it cuts to the day.
        match granularity {
            DateGranularity::Day => format!("TRUNC({field})"),
            other => format!("TRUNC({field}, '{}')", other.trunc_format()),
        }
    }

    fn datetime_cast_sql(&self) -> String {
        format!("TO_TIMESTAMP(%s, '{TIMESTAMP_FORMAT}')")
    }

    fn random_function_sql(&self) -> &'static str {
        "DBMS_RANDOM.RANDOM"
    }

    fn regex_lookup(&self, lookup: LookupType) -> Result<Cow<'static, str>> {
        match self.regex {
            RegexSupport::Unresolved => Err(DialectError::CapabilityUnresolved("regex lookups")),
            RegexSupport::Unsupported(version) => Err(DialectError::Unsupported {
                feature: "regex lookups",
                reason: format!("Oracle {version} predates 10g"),
            }),
            RegexSupport::Supported(_) => {
                let match_option = if lookup == LookupType::Regex { "'c'" } else { "'i'" };
                Ok(Cow::Owned(format!("REGEXP_LIKE(%s, %s, {match_option})")))
            }
        }
    }

    fn field_cast_sql(&self, db_type: &str) -> &'static str {
        if db_type.ends_with("LOB") {
            "DBMS_LOB.SUBSTR(%s)"
        } else {
            "%s"
        }
    }

    fn deferrable_sql(&self) -> &'static str {
        " DEFERRABLE INITIALLY DEFERRED"
    }

    fn start_transaction_sql(&self) -> &'static str {
        ""
    }

    fn tablespace_sql(&self, tablespace: &str, inline: bool) -> Option<String> {
        let prefix = if inline { "USING INDEX " } else { "" };
        Some(format!("{prefix}TABLESPACE {}", self.quote_name(tablespace)))
    }

    fn autoinc_sql(&self, table: &str, column: &str) -> Option<AutoincSql> {
        Some(sequence::autoinc_sql(table, column))
    }

    fn sequence_reset_statement(&self, table: &str, column: &str) -> Option<String> {
        Some(sequence::sequence_reset_statement(table, column))
    }

    fn sql_flush(
        &self,
        style: &dyn SqlStyle,
        tables: &[&str],
        sequences: &[SequenceInfo],
    ) -> Vec<String> {
        sequence::sql_flush(style, tables, sequences)
    }

    fn sequence_reset_sql(&self, style: &dyn SqlStyle, models: &[ModelMeta]) -> Vec<String> {
        sequence::sequence_reset_sql(style, models)
    }

    fn drop_sequence_sql(&self, table: &str) -> Option<String> {
        Some(sequence::drop_sequence_sql(table))
    }

    fn last_insert_id_sql(&self, table: &str, _pk_name: &str) -> Option<String> {
        Some(format!(
            "SELECT {}.currval FROM dual",
            naming::sequence_name(table)
        ))
    }

    fn value_to_db_time(&self, value: Option<&TimeInput>) -> Result<Option<NaiveDateTime>> {
        // Oracle has no TIME type; times live on a fixed date.
        let Some(value) = value else {
            return Ok(None);
        };
        let time = value.to_time()?;
        let epoch = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default();
        Ok(Some(epoch.and_time(time)))
    }

    fn year_lookup_bounds_for_date_field(&self, year: i32) -> [String; 2] {
        [format!("{year:04}-01-01"), format!("{year:04}-12-31")]
    }
}
