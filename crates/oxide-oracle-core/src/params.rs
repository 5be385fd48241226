//! Parameter marshalling.
//!
//! Turns caller-supplied values into driver-ready bound values. Text is encoded
//! into the connection charset and oversized text is flagged as `NCLOB` so the
//! driver does not truncate it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};
use crate::value::{SqlValue, ToSqlValue};

/// Text longer than this many characters is bound as a large object.
pub const LOB_THRESHOLD: usize = 4000;

/// Driver type hint attached to a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSize {
    /// National character large object.
    Nclob,
    /// Character large object.
    Clob,
    /// Binary large object.
    Blob,
    /// Variable-length national string of the given size.
    Nvarchar(usize),
    /// Variable-length string of the given size.
    Varchar(usize),
    /// Numeric value.
    Number,
    /// Timestamp value.
    Timestamp,
}

/// Character encoding used for text sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    /// UTF-8 (`AL32UTF8`).
    #[default]
    #[serde(alias = "utf-8", alias = "UTF8", alias = "AL32UTF8")]
    Utf8,
    /// Big-endian UTF-16 (`AL16UTF16`).
    #[serde(alias = "utf-16", alias = "AL16UTF16")]
    Utf16,
    /// ISO-8859-1 (`WE8ISO8859P1`).
    #[serde(alias = "iso-8859-1", alias = "WE8ISO8859P1")]
    Latin1,
}

impl Charset {
    /// Returns the charset name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Latin1 => "iso-8859-1",
        }
    }

    /// Encodes `text` into this charset.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Unencodable`] when `text` contains a character
    /// the charset cannot represent.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16 => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Self::Latin1 => text
                .chars()
                .map(|ch| {
                    u8::try_from(u32::from(ch)).map_err(|_| DialectError::Unencodable {
                        charset: self.name(),
                        ch,
                    })
                })
                .collect(),
        }
    }
}

/// A caller-supplied value with an optional explicit type hint.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// The host value.
    pub value: SqlValue,
    /// Explicit hint; takes precedence over any inferred one.
    pub input_size: Option<InputSize>,
}

impl Param {
    /// Creates a parameter without an explicit hint.
    pub fn new(value: impl ToSqlValue) -> Self {
        Self {
            value: value.to_sql_value(),
            input_size: None,
        }
    }

    /// Sets an explicit type hint.
    #[must_use]
    pub fn with_input_size(mut self, input_size: InputSize) -> Self {
        self.input_size = Some(input_size);
        self
    }
}

impl<T: ToSqlValue> From<T> for Param {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// Statement parameters in positional or named style.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// `:1, :2, ...` style.
    Positional(Vec<Param>),
    /// `:name` style.
    Named(BTreeMap<String, Param>),
}

impl Default for Params {
    fn default() -> Self {
        Self::Positional(Vec::new())
    }
}

impl Params {
    /// No parameters.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds positional parameters.
    pub fn positional<I, P>(values: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        Self::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Builds named parameters.
    pub fn named<I, K, P>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: Into<Param>,
    {
        Self::Named(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Positional(v) => v.len(),
            Self::Named(m) => m.len(),
        }
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A value ready for the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// Text encoded in the connection charset.
    Text(Vec<u8>),
    /// Any non-text value, passed through unchanged.
    Value(SqlValue),
}

/// A bound value plus its resolved type hint.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    /// The encoded value.
    pub value: BoundValue,
    /// Type hint for the driver, if any.
    pub input_size: Option<InputSize>,
}

/// Marshalled parameters, mirroring the style of the input [`Params`].
#[derive(Debug, Clone, PartialEq)]
pub enum BoundParams {
    /// Positional values.
    Positional(Vec<BoundParam>),
    /// Named values.
    Named(BTreeMap<String, BoundParam>),
}

impl BoundParams {
    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Positional(v) => v.len(),
            Self::Named(m) => m.len(),
        }
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type hints collected across a batch of parameter sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSizes {
    /// One slot per positional parameter.
    Positional(Vec<Option<InputSize>>),
    /// Hints keyed by parameter name; names without a hint are absent.
    Named(BTreeMap<String, InputSize>),
}

/// Resolves the type hint for a single value.
///
/// An explicit hint wins; otherwise text longer than [`LOB_THRESHOLD`]
/// characters gets [`InputSize::Nclob`] and everything else gets no hint.
#[must_use]
pub fn input_size_for(param: &Param) -> Option<InputSize> {
    param.input_size.or(match &param.value {
        SqlValue::Text(s) if s.chars().count() > LOB_THRESHOLD => Some(InputSize::Nclob),
        _ => None,
    })
}

/// Marshals one parameter.
///
/// # Errors
///
/// Returns [`DialectError::Unencodable`] if text cannot be encoded in `charset`.
pub fn marshal_param(param: Param, charset: Charset) -> Result<BoundParam> {
    let input_size = input_size_for(&param);
    let value = match param.value {
        SqlValue::Text(s) => BoundValue::Text(charset.encode(&s)?),
        other => BoundValue::Value(other),
    };
    Ok(BoundParam { value, input_size })
}

/// Marshals a full parameter set, preserving its style.
///
/// # Errors
///
/// Returns [`DialectError::Unencodable`] if any text value cannot be encoded.
pub fn marshal(params: Params, charset: Charset) -> Result<BoundParams> {
    match params {
        Params::Positional(values) => values
            .into_iter()
            .map(|p| marshal_param(p, charset))
            .collect::<Result<Vec<_>>>()
            .map(BoundParams::Positional),
        Params::Named(values) => values
            .into_iter()
            .map(|(k, p)| marshal_param(p, charset).map(|b| (k, b)))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(BoundParams::Named),
    }
}

/// Collects the type hints of a batch for `executemany`.
///
/// The style follows the first parameter set. Returns `None` for an empty batch.
#[must_use]
pub fn guess_input_sizes(batch: &[BoundParams]) -> Option<InputSizes> {
    match batch.first()? {
        BoundParams::Positional(first) => {
            let mut sizes = vec![None; first.len()];
            for params in batch {
                if let BoundParams::Positional(values) = params {
                    for (i, param) in values.iter().enumerate() {
                        if let Some(size) = param.input_size {
                            if i >= sizes.len() {
                                sizes.resize(i + 1, None);
                            }
                            sizes[i] = Some(size);
                        }
                    }
                }
            }
            Some(InputSizes::Positional(sizes))
        }
        BoundParams::Named(_) => {
            let mut sizes = BTreeMap::new();
            for params in batch {
                if let BoundParams::Named(values) = params {
                    for (name, param) in values {
                        if let Some(size) = param.input_size {
                            sizes.insert(name.clone(), size);
                        }
                    }
                }
            }
            Some(InputSizes::Named(sizes))
        }
    }
}
