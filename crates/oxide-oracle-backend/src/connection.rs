//! Connection lifecycle.
//!
//! [`DatabaseWrapper`] connects lazily on the first [`DatabaseWrapper::cursor`]
//! call, prepares the session, and discovers server capabilities. Every
//! stateful method takes `&mut self`, so the check-then-connect step needs no
//! locking.

use std::borrow::Cow;
use std::fmt;

use oxide_oracle_core::{
    BoundParams, DatabaseFeatures, DatabaseOperations, DialectError, LookupType, OracleOperations,
    SESSION_INIT_SQL, ServerVersion,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::cursor::Cursor;
use crate::driver::{CursorOf, Driver, DriverConnection, DriverCursor, ErrorOf};
use crate::error::{BackendError, Result};

enum State<C> {
    Unconnected,
    Connected(C),
    Closed,
}

impl<C> State<C> {
    const fn name(&self) -> &'static str {
        match self {
            Self::Unconnected => "unconnected",
            Self::Connected(_) => "connected",
            Self::Closed => "closed",
        }
    }
}

/// Capabilities exported to the upstream framework.
#[derive(Debug, Serialize)]
struct Capabilities<'a> {
    vendor: &'static str,
    server_version: Option<String>,
    features: &'a DatabaseFeatures,
}

/// An Oracle connection wrapping driver `D`.
pub struct DatabaseWrapper<D: Driver> {
    driver: D,
    config: ConnectionConfig,
    state: State<D::Connection>,
    ops: OracleOperations,
    features: DatabaseFeatures,
}

impl<D: Driver> fmt::Debug for DatabaseWrapper<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseWrapper")
            .field("config", &self.config)
            .field("state", &self.state.name())
            .field("ops", &self.ops)
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

impl<D: Driver> DatabaseWrapper<D> {
    /// Creates an unconnected wrapper. No I/O happens until the first cursor.
    pub fn new(config: ConnectionConfig, driver: D) -> Self {
        Self {
            driver,
            config,
            state: State::Unconnected,
            ops: OracleOperations::new(),
            features: DatabaseFeatures::oracle(),
        }
    }

    /// Replaces the dialect operations, e.g. with a pre-resolved server version.
    #[must_use]
    pub const fn with_operations(mut self, ops: OracleOperations) -> Self {
        self.ops = ops;
        self
    }

    /// Connection settings.
    pub const fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Dialect operations.
    pub const fn ops(&self) -> &OracleOperations {
        &self.ops
    }

    /// Capability flags.
    pub const fn features(&self) -> &DatabaseFeatures {
        &self.features
    }

    /// Returns true while a driver handle is held.
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected(_))
    }

    /// Returns true after [`Self::close`].
    pub const fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Returns a cursor, connecting first if needed.
    ///
    /// # Errors
    ///
    /// - [`BackendError::NotConnected`] after [`Self::close`].
    /// - [`BackendError::Configuration`] if the settings are incomplete.
    /// - The driver's error if connecting or opening the cursor fails.
    pub fn cursor(&mut self) -> Result<Cursor<'_, CursorOf<D>>, ErrorOf<D>> {
        let charset = self.config.charset;
        let arraysize = self.config.arraysize;
        let conn = self.ensure_connected()?;
        let inner = conn.cursor().map_err(BackendError::from_driver)?;
        Ok(Cursor::new(inner, charset, arraysize))
    }

    /// Releases the driver handle. Later operations fail with
    /// [`BackendError::NotConnected`].
    ///
    /// # Errors
    ///
    /// Returns the driver's error if closing the session fails. The wrapper is
    /// closed either way.
    pub fn close(&mut self) -> Result<(), ErrorOf<D>> {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Connected(mut conn) => {
                info!(name = %self.config.name, "closing Oracle connection");
                conn.close().map_err(BackendError::from_driver)
            }
            State::Unconnected | State::Closed => Ok(()),
        }
    }

    /// Like [`DatabaseOperations::lookup_operator`], but resolves server
    /// capabilities on demand.
    ///
    /// # Errors
    ///
    /// See [`Self::regex_lookup`].
    pub fn lookup_operator(&mut self, lookup: LookupType) -> Result<Cow<'static, str>, ErrorOf<D>> {
        self.with_capabilities(|ops| ops.lookup_operator(lookup))
    }

    /// Returns the `REGEXP_LIKE` template for `regex` or `iregex`.
    ///
    /// If the server version is not known yet, one round trip is made to learn
    /// it and the lookup is retried once.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Dialect`] if the server predates regex support.
    /// - [`BackendError::CapabilityDiscovery`] if the version is still unknown
    ///   after the round trip.
    /// - Any error from connecting.
    pub fn regex_lookup(&mut self, lookup: LookupType) -> Result<Cow<'static, str>, ErrorOf<D>> {
        self.with_capabilities(|ops| ops.regex_lookup(lookup))
    }

    /// Returns the id generated by the last insert into `table` on this session.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnexpectedValue`] if the server returns something
    /// other than an integer, or any cursor error.
    pub fn last_insert_id(&mut self, table: &str, pk_name: &str) -> Result<Option<i64>, ErrorOf<D>> {
        let Some(sql) = self.ops.last_insert_id_sql(table, pk_name) else {
            return Ok(None);
        };
        let mut cursor = self.cursor()?;
        cursor.execute(&sql, oxide_oracle_core::Params::none())?;
        let Some(row) = cursor.fetchone()? else {
            return Ok(None);
        };
        match row.first() {
            None | Some(crate::DbValue::Null) => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                BackendError::UnexpectedValue(format!("non-integer id {value:?} for {table}"))
            }),
        }
    }

    /// Serializes the capability flags and server version as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::UnexpectedValue`] if serialization fails.
    pub fn capabilities_json(&self) -> Result<String, ErrorOf<D>> {
        let capabilities = Capabilities {
            vendor: self.ops.name(),
            server_version: self.ops.server_version().map(|v| v.to_string()),
            features: &self.features,
        };
        serde_json::to_string(&capabilities)
            .map_err(|e| BackendError::UnexpectedValue(e.to_string()))
    }

    fn with_capabilities<T>(
        &mut self,
        f: impl Fn(&OracleOperations) -> oxide_oracle_core::Result<T>,
    ) -> Result<T, ErrorOf<D>> {
        if self.is_closed() {
            return Err(BackendError::NotConnected);
        }
        match f(&self.ops) {
            Err(DialectError::CapabilityUnresolved(_)) => {}
            other => return other.map_err(BackendError::from),
        }
        self.force_discovery()?;
        match f(&self.ops) {
            Err(DialectError::CapabilityUnresolved(what)) => Err(BackendError::CapabilityDiscovery(
                format!("{what}: server version could not be determined"),
            )),
            other => other.map_err(BackendError::from),
        }
    }

    fn force_discovery(&mut self) -> Result<(), ErrorOf<D>> {
        if let State::Connected(conn) = &mut self.state {
            Self::discover(&mut self.ops, conn);
            return Ok(());
        }
        // Connecting runs discovery.
        self.ensure_connected().map(|_| ())
    }

    fn ensure_connected(&mut self) -> Result<&mut D::Connection, ErrorOf<D>> {
        match self.state {
            State::Closed => return Err(BackendError::NotConnected),
            State::Unconnected => {
                let conn = self.connect()?;
                self.state = State::Connected(conn);
            }
            State::Connected(_) => {}
        }
        match &mut self.state {
            State::Connected(conn) => Ok(conn),
            State::Unconnected | State::Closed => Err(BackendError::NotConnected),
        }
    }

    fn connect(&mut self) -> Result<D::Connection, ErrorOf<D>> {
        self.config.validate()?;
        let dsn = self.config.connection_string();
        info!(dsn = %dsn, user = %self.config.user, "opening Oracle connection");

        let mut conn = self
            .driver
            .connect(&dsn, &self.config.user, &self.config.password)
            .map_err(BackendError::from_driver)?;

        if let Err(e) = Self::init_session(&mut conn) {
            if let Err(close_err) = conn.close() {
                warn!(error = %close_err, "failed to close connection after session setup error");
            }
            return Err(BackendError::from_driver(e));
        }

        if let Err(e) = conn.set_statement_cache_size(self.config.statement_cache_size) {
            debug!(error = %e, "statement cache size not supported by driver");
        }

        Self::discover(&mut self.ops, &mut conn);
        Ok(conn)
    }

    fn init_session(conn: &mut D::Connection) -> std::result::Result<(), ErrorOf<D>> {
        let mut session = conn.cursor()?;
        session.set_numbers_as_strings(true);
        session.execute(SESSION_INIT_SQL, &BoundParams::Positional(Vec::new()))
    }

    fn discover(ops: &mut OracleOperations, conn: &mut D::Connection) {
        match conn.server_version() {
            Ok(banner) => match ServerVersion::parse(&banner) {
                Some(version) => {
                    debug!(version = %version, "resolved server version");
                    ops.resolve(version);
                }
                None => warn!(banner = %banner, "could not parse server version"),
            },
            Err(e) => warn!(error = %e, "server version query failed"),
        }
    }
}
