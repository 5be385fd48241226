//! Abstract lookup and date operations understood by the dialect.

use std::fmt;
use std::str::FromStr;

use crate::error::DialectError;

/// Escape character declared on every `LIKEC` pattern.
pub const LIKE_ESCAPE: char = '\\';

/// A field lookup requested by the ORM (`field__icontains=value`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupType {
    /// `exact`
    Exact,
    /// `iexact`
    IExact,
    /// `contains`
    Contains,
    /// `icontains`
    IContains,
    /// `gt`
    Gt,
    /// `gte`
    Gte,
    /// `lt`
    Lt,
    /// `lte`
    Lte,
    /// `startswith`
    StartsWith,
    /// `istartswith`
    IStartsWith,
    /// `endswith`
    EndsWith,
    /// `iendswith`
    IEndsWith,
    /// `in`
    In,
    /// `range`
    Range,
    /// `isnull`
    IsNull,
    /// `regex`
    Regex,
    /// `iregex`
    IRegex,
}

impl LookupType {
    /// All lookup types, in declaration order.
    pub const ALL: [Self; 17] = [
        Self::Exact,
        Self::IExact,
        Self::Contains,
        Self::IContains,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::StartsWith,
        Self::IStartsWith,
        Self::EndsWith,
        Self::IEndsWith,
        Self::In,
        Self::Range,
        Self::IsNull,
        Self::Regex,
        Self::IRegex,
    ];

    /// Returns the lookup name as written in ORM filters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::In => "in",
            Self::Range => "range",
            Self::IsNull => "isnull",
            Self::Regex => "regex",
            Self::IRegex => "iregex",
        }
    }

    /// Returns true for lookups that compare case-insensitively.
    #[must_use]
    pub const fn is_case_insensitive(self) -> bool {
        matches!(
            self,
            Self::IExact | Self::IContains | Self::IStartsWith | Self::IEndsWith | Self::IRegex
        )
    }

    /// Returns true for lookups rendered as a pattern match.
    #[must_use]
    pub const fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::Contains
                | Self::IContains
                | Self::StartsWith
                | Self::IStartsWith
                | Self::EndsWith
                | Self::IEndsWith
        )
    }

    /// Returns true for regular-expression lookups.
    #[must_use]
    pub const fn is_regex(self) -> bool {
        matches!(self, Self::Regex | Self::IRegex)
    }

    /// Turns a user value into the pattern bound for this lookup.
    ///
    /// Wildcards in the value are escaped with [`LIKE_ESCAPE`], then wrapped in
    /// `%` according to the match position. Non-pattern lookups return the value
    /// unchanged.
    ///
    /// ```rust
    /// use oxide_oracle_core::LookupType;
    ///
    /// assert_eq!(LookupType::Contains.prep_pattern("50%"), "%50\\%%");
    /// assert_eq!(LookupType::StartsWith.prep_pattern("a_b"), "a\\_b%");
    /// assert_eq!(LookupType::Exact.prep_pattern("50%"), "50%");
    /// ```
    #[must_use]
    pub fn prep_pattern(self, value: &str) -> String {
        match self {
            Self::Contains | Self::IContains => format!("%{}%", escape_like(value)),
            Self::StartsWith | Self::IStartsWith => format!("{}%", escape_like(value)),
            Self::EndsWith | Self::IEndsWith => format!("%{}", escape_like(value)),
            _ => value.to_string(),
        }
    }
}

impl fmt::Display for LookupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupType {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| DialectError::UnknownLookup(s.to_string()))
    }
}

/// Escapes `LIKE` wildcards and the escape character itself.
#[must_use]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Date part used for truncation and extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateGranularity {
    /// Calendar year.
    Year,
    /// Calendar month.
    Month,
    /// Calendar day.
    Day,
    /// Hour of day.
    Hour,
    /// Minute of hour.
    Minute,
}

impl DateGranularity {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
        }
    }

    /// Returns the Oracle `TRUNC` format model for this granularity.
    #[must_use]
    pub const fn trunc_format(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "dd",
            Self::Hour => "hh24",
            Self::Minute => "mi",
        }
    }
}

impl fmt::Display for DateGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateGranularity {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "month" => Ok(Self::Month),
            "day" => Ok(Self::Day),
            "hour" => Ok(Self::Hour),
            "minute" => Ok(Self::Minute),
            _ => Err(DialectError::UnknownGranularity(s.to_string())),
        }
    }
}
