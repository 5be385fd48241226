//! Connection configuration.
//!
//! Settings are passed explicitly when a connection is built; nothing is read
//! from or written to the process environment.

use std::fmt;
use std::path::Path;

use oxide_oracle_core::Charset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Default statement cache size hint.
pub const DEFAULT_STATEMENT_CACHE_SIZE: u32 = 20;

/// Default number of rows returned by `fetchmany` without a size.
pub const DEFAULT_ARRAYSIZE: usize = 100;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is empty.
    #[error("you need to specify the database {0} in your settings")]
    Missing(&'static str),

    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_statement_cache_size() -> u32 {
    DEFAULT_STATEMENT_CACHE_SIZE
}

fn default_arraysize() -> usize {
    DEFAULT_ARRAYSIZE
}

/// Settings for one Oracle connection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server host; empty means [`DEFAULT_HOST`].
    #[serde(default)]
    pub host: String,

    /// Listener port; `None` leaves it to the driver default.
    #[serde(default)]
    pub port: Option<u16>,

    /// Database (SID) name. Required.
    #[serde(default)]
    pub name: String,

    /// User name.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Encoding for text sent to the server.
    #[serde(default)]
    pub charset: Charset,

    /// Statement cache size hint, applied when the driver supports it.
    #[serde(default = "default_statement_cache_size")]
    pub statement_cache_size: u32,

    /// Rows returned by `fetchmany` when no size is given.
    #[serde(default = "default_arraysize")]
    pub arraysize: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            name: String::new(),
            user: String::new(),
            password: String::new(),
            charset: Charset::default(),
            statement_cache_size: DEFAULT_STATEMENT_CACHE_SIZE,
            arraysize: DEFAULT_ARRAYSIZE,
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"***")
            .field("charset", &self.charset)
            .field("statement_cache_size", &self.statement_cache_size)
            .field("arraysize", &self.arraysize)
            .finish()
    }
}

impl ConnectionConfig {
    /// Creates a configuration for database `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets user and password.
    #[must_use]
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    /// Sets the character encoding.
    #[must_use]
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that the settings needed to connect are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the database name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Missing("name"));
        }
        Ok(())
    }

    /// Host to connect to.
    #[must_use]
    pub fn effective_host(&self) -> &str {
        if self.host.is_empty() {
            DEFAULT_HOST
        } else {
            &self.host
        }
    }

    /// Thin-driver connection string, `jdbc:oracle:thin:@host:port:name`.
    #[must_use]
    pub fn connection_string(&self) -> String {
        let port = self.port.map(|p| p.to_string()).unwrap_or_default();
        format!(
            "jdbc:oracle:thin:@{}:{port}:{}",
            self.effective_host(),
            self.name
        )
    }
}
