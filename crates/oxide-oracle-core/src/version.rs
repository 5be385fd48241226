//! Oracle server version parsing.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// First major release with `REGEXP_LIKE`.
pub const REGEX_MIN_MAJOR: u32 = 10;

/// Version of the connected Oracle server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ServerVersion {
    /// Major release (9, 10, 11, ...).
    pub major: u32,
    /// Minor release.
    pub minor: u32,
}

impl ServerVersion {
    /// Creates a version.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Extracts the version from a dotted string or a server banner.
    ///
    /// ```rust
    /// use oxide_oracle_core::ServerVersion;
    ///
    /// assert_eq!(ServerVersion::parse("10.2.0.1.0"), Some(ServerVersion::new(10, 2)));
    /// assert_eq!(
    ///     ServerVersion::parse("Oracle Database 11g Release 11.2.0.1.0 - Production"),
    ///     Some(ServerVersion::new(11, 2))
    /// );
    /// assert_eq!(ServerVersion::parse("unknown"), None);
    /// ```
    #[must_use]
    pub fn parse(banner: &str) -> Option<Self> {
        static VERSION_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
        let regex = VERSION_REGEX
            .get_or_init(|| Regex::new(r"(\d+)\.(\d+)(?:\.\d+)*").ok())
            .as_ref()?;
        let caps = regex.captures(banner)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
        })
    }

    /// Returns true if the server supports `REGEXP_LIKE`.
    #[must_use]
    pub const fn supports_regex(self) -> bool {
        self.major >= REGEX_MIN_MAJOR
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
