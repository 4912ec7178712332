//! Keyword to table identifier mapping.
//!
//! [`table_name`] is the raw, total transformation. [`TableName`] wraps its
//! output after checking that it only contains characters that are safe
//! inside a quoted `DuckDB` identifier. Table names cannot be bound as query
//! parameters, so everything that interpolates one goes through
//! [`TableName::quoted`].

use std::fmt;

use crate::DbError;

/// Maps a keyword to its table identifier: spaces and hyphens become
/// underscores and the result is lowercased.
///
/// Pure and idempotent. No other characters are touched, so the result
/// still has to pass [`TableName::parse`] before it reaches SQL.
#[must_use]
pub fn table_name(keyword: &str) -> String {
    keyword.replace([' ', '-'], "_").to_lowercase()
}

/// A validated table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
    /// Derives and validates the table name for `keyword`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidTableName`] if the derived identifier is
    /// empty or contains characters outside letters, digits and `_`.
    /// Lowercasing can introduce combining marks (`İ` becomes `i\u{307}`),
    /// so such keywords are rejected too.
    pub fn from_keyword(keyword: &str) -> Result<Self, DbError> {
        Self::parse(table_name(keyword))
    }

    /// Validates an already-derived identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidTableName`] if `name` is empty or contains
    /// characters outside letters, digits and `_`.
    pub fn parse(name: impl Into<String>) -> Result<Self, DbError> {
        let name = name.into();
        if name.is_empty() {
            return Err(DbError::InvalidTableName {
                name,
                reason: "identifier is empty",
            });
        }
        if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(DbError::InvalidTableName {
                name,
                reason: "only letters, digits and '_' are allowed; combining marks are not letters",
            });
        }
        Ok(Self(name))
    }

    /// The bare identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier wrapped in double quotes, ready for SQL.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
