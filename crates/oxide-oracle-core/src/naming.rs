//! Identifier naming policy.
//!
//! Oracle folds unquoted identifiers to uppercase and rejects names longer than
//! [`MAX_NAME_LENGTH`] characters. Everything that reaches generated SQL goes
//! through [`quote_name`], so the rules live in one place.

/// Maximum identifier length accepted by Oracle.
pub const MAX_NAME_LENGTH: usize = 30;

/// Length of the digest appended to truncated names.
const DIGEST_LEN: usize = 4;

/// Suffix of auto-increment sequences.
pub const SEQUENCE_SUFFIX: &str = "_SQ";

/// Suffix of auto-increment triggers.
pub const TRIGGER_SUFFIX: &str = "_TR";

/// Shortens `name` to at most `length` characters.
///
/// Names that already fit are returned unchanged. Longer names keep their first
/// `length - 4` characters followed by a 4-digit hex digest of the full name, so
/// two long names sharing a prefix still map to different identifiers.
///
/// ```rust
/// use oxide_oracle_core::truncate_name;
///
/// assert_eq!(truncate_name("short", 30), "short");
/// let long = "a_really_long_table_name_that_overflows";
/// let truncated = truncate_name(long, 30);
/// assert_eq!(truncated.chars().count(), 30);
/// assert!(truncated.starts_with("a_really_long_table_name_t"));
/// ```
#[must_use]
pub fn truncate_name(name: &str, length: usize) -> String {
    if name.chars().count() <= length {
        return name.to_string();
    }
    if length <= DIGEST_LEN {
        return name.chars().take(length).collect();
    }
    let mut truncated: String = name.chars().take(length - DIGEST_LEN).collect();
    truncated.push_str(&digest(name));
    truncated
}

/// Quotes an identifier for use in Oracle SQL.
///
/// Undelimited names are truncated, uppercased and wrapped in double quotes.
/// Names that are already delimited keep their case but are still truncated.
/// Quoting is idempotent: `quote_name(&quote_name(x)) == quote_name(x)`.
///
/// ```rust
/// use oxide_oracle_core::quote_name;
///
/// assert_eq!(quote_name("blog_entry"), "\"BLOG_ENTRY\"");
/// assert_eq!(quote_name("\"MixedCase\""), "\"MixedCase\"");
/// assert_eq!(quote_name(&quote_name("blog_entry")), "\"BLOG_ENTRY\"");
/// ```
#[must_use]
pub fn quote_name(name: &str) -> String {
    if let Some(inner) = delimited(name) {
        return format!("\"{}\"", truncate_name(inner, MAX_NAME_LENGTH));
    }
    // Embedded quotes can never be part of a legal identifier.
    let cleaned: String = name.chars().filter(|c| *c != '"').collect();
    format!(
        "\"{}\"",
        uppercase(&truncate_name(&cleaned, MAX_NAME_LENGTH))
    )
}

/// Returns the name with surrounding double quotes removed, if present.
#[must_use]
pub fn strip_quotes(name: &str) -> &str {
    delimited(name).unwrap_or(name)
}

/// Name of the sequence that feeds the auto-increment column of `table`.
///
/// ```rust
/// use oxide_oracle_core::sequence_name;
///
/// assert_eq!(sequence_name("blog_entry"), "BLOG_ENTRY_SQ");
/// ```
#[must_use]
pub fn sequence_name(table: &str) -> String {
    suffixed(table, SEQUENCE_SUFFIX)
}

/// Name of the trigger that fills the auto-increment column of `table`.
#[must_use]
pub fn trigger_name(table: &str) -> String {
    suffixed(table, TRIGGER_SUFFIX)
}

// Derived names are spliced into PL/SQL string literals and unquoted
// identifiers, so quote characters are dropped.
fn suffixed(table: &str, suffix: &str) -> String {
    let cleaned: String = strip_quotes(table)
        .chars()
        .filter(|c| !matches!(c, '\'' | '"'))
        .collect();
    let base = truncate_name(&cleaned, MAX_NAME_LENGTH - suffix.len());
    format!("{}{suffix}", uppercase(&base))
}

fn delimited(name: &str) -> Option<&str> {
    if name.len() >= 2 && name.starts_with('"') && name.ends_with('"') {
        Some(&name[1..name.len() - 1])
    } else {
        None
    }
}

/// Uppercases character by character, leaving characters whose uppercase form
/// expands (such as `ß`) untouched so the length stays stable.
fn uppercase(name: &str) -> String {
    name.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            }
        })
        .collect()
}

/// FNV-1a over the name, folded to four uppercase hex digits.
fn digest(name: &str) -> String {
    let hash = name.bytes().fold(0x811c_9dc5_u32, |acc, byte| {
        (acc ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    });
    format!("{:04X}", hash >> 16)
}
