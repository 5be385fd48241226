//! Oracle connection lifecycle for the oxide ORM layer.
//!
//! `oxide-oracle-backend` sits between the ORM and an Oracle driver:
//! - connects lazily and prepares each session (NLS date formats, statement
//!   cache size)
//! - discovers the server version so version-dependent SQL can be chosen
//! - marshals parameters (charset encoding, `NCLOB` hints for long text)
//! - surfaces driver errors unchanged, with constraint violations flagged
//!
//! The wire protocol is not implemented here. Plug in any type implementing
//! [`Driver`].
//!
//! # Example
//!
//! ```rust,ignore
//! use oxide_oracle_backend::prelude::*;
//!
//! let config = ConnectionConfig::new("orcl")
//!     .host("db.internal")
//!     .port(1521)
//!     .credentials("scott", "tiger");
//! let mut db = DatabaseWrapper::new(config, MyDriver::default());
//!
//! let mut cursor = db.cursor()?;
//! cursor.execute("SELECT ID FROM \"AUTH_USER\" WHERE \"USERNAME\" = :1", Params::positional(["admin"]))?;
//! let row = cursor.fetchone()?;
//! ```

pub mod config;
pub mod connection;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod introspection;

pub use config::{ConfigError, ConnectionConfig};
pub use connection::DatabaseWrapper;
pub use cursor::{Cursor, normalize_statement};
pub use driver::{
    CursorOf, DbValue, Driver, DriverConnection, DriverCursor, DriverError, ErrorOf, Row,
};
pub use error::{BackendError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{ConfigError, ConnectionConfig};
    pub use crate::connection::DatabaseWrapper;
    pub use crate::cursor::Cursor;
    pub use crate::driver::{DbValue, Driver, DriverConnection, DriverCursor, DriverError, Row};
    pub use crate::error::{BackendError, Result};
    pub use oxide_oracle_core::{
        DatabaseFeatures, DatabaseOperations, LookupType, OracleOperations, Param, Params,
        SqlValue,
    };
}
