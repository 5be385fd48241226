//! Styling hooks for generated management SQL.
//!
//! Tools that print SQL (for example a `sqlflush` command) can highlight
//! keywords and identifiers. Code that executes the SQL uses [`PlainStyle`].

/// Decorates parts of generated SQL.
pub trait SqlStyle {
    /// Decorates a SQL keyword.
    fn keyword(&self, text: &str) -> String {
        text.to_string()
    }

    /// Decorates a table or column identifier.
    fn field(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Style that leaves SQL untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStyle;

impl SqlStyle for PlainStyle {}
