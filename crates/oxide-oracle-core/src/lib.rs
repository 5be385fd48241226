//! # oxide-oracle-core
//!
//! Oracle dialect support for the oxide ORM layer.
//!
//! This crate turns engine-agnostic operations into Oracle SQL text. It never
//! talks to a database; the connection lifecycle lives in `oxide-oracle-backend`.
//!
//! # How Oracle differs from other dialects
//!
//! - **Identifiers**: unquoted names are folded to uppercase and limited to
//!   [`MAX_NAME_LENGTH`] characters. [`quote_name`] always produces a quoted,
//!   uppercase, length-safe identifier.
//! - **No AUTOINCREMENT**: primary keys are filled by a sequence plus a
//!   `BEFORE INSERT` trigger. See [`sequence::autoinc_sql`].
//! - **Empty strings are NULL**: see [`DatabaseFeatures`].
//! - **Large text**: bind values longer than [`LOB_THRESHOLD`] characters must be
//!   bound as `NCLOB`. See [`params::marshal`].
//! - **Regular expressions**: `REGEXP_LIKE` exists from 10g onwards only.
//!
//! ## Example
//!
//! ```rust
//! use oxide_oracle_core::{DatabaseOperations, LookupType, OracleOperations, quote_name};
//!
//! let ops = OracleOperations::new();
//! assert_eq!(quote_name("auth_user"), "\"AUTH_USER\"");
//! assert_eq!(
//!     ops.lookup_operator(LookupType::IContains).unwrap(),
//!     "LIKEC UPPER(%s) ESCAPE '\\'"
//! );
//! assert_eq!(ops.date_trunc_sql("month".parse().unwrap(), "\"PUB_DATE\""),
//!     "TRUNC(\"PUB_DATE\", 'month')");
//! ```

pub mod error;
pub mod features;
pub mod lookup;
pub mod naming;
pub mod ops;
pub mod params;
pub mod sequence;
pub mod style;
pub mod value;
pub mod version;

pub use error::{DialectError, Result};
pub use features::{BaseFeatures, DatabaseFeatures, EmptyFetchmany, FeatureOverrides};
pub use lookup::{DateGranularity, LookupType};
pub use naming::{MAX_NAME_LENGTH, quote_name, sequence_name, trigger_name, truncate_name};
pub use ops::{
    DATE_FORMAT, DatabaseOperations, OracleOperations, RegexSupport, SESSION_INIT_SQL,
    TIMESTAMP_FORMAT, TimeInput, format_timestamp, parse_timestamp,
};
pub use params::{
    BoundParam, BoundParams, BoundValue, Charset, InputSize, InputSizes, LOB_THRESHOLD, Param,
    Params,
};
pub use sequence::{AutoincSql, ModelMeta, SequenceInfo};
pub use style::{PlainStyle, SqlStyle};
pub use value::{SqlValue, ToSqlValue};
pub use version::ServerVersion;
