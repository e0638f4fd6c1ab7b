//! Error types for the table engine.

use thiserror::Error;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors that can occur while loading or rolling tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// No table or bundle is registered under the identifier.
    #[error("table not found: {0}")]
    NotFound(String),

    /// A relative path was resolved without a table to anchor it.
    #[error("relative table path \"{0}\" has no reference table")]
    RelativeWithoutAnchor(String),

    /// Registered identifiers must be absolute.
    #[error("identifier must be absolute (start with \"/\"): {0}")]
    NonAbsoluteIdentifier(String),

    /// A definition does not have the shape of a table or bundle.
    #[error("invalid definition for {identifier}: {reason}")]
    InvalidDefinition {
        /// The identifier being registered.
        identifier: String,
        /// What is wrong with the definition.
        reason: String,
    },

    /// A multi-dimensional table declared no dimensions.
    #[error("no dimensions provided for {0}")]
    MissingDimensions(String),

    /// A total selected no row. Indicates a malformed table.
    #[error("bad roll! {total} on {table}")]
    NoRowForTotal {
        /// The rolled or forced total.
        total: i64,
        /// The table identifier.
        table: String,
    },

    /// The identifier names a bundle where a table was required.
    #[error("not a table: {0}")]
    NotATable(String),

    /// A definition document could not be decoded.
    #[error("cannot decode definitions: {0}")]
    Json(#[from] serde_json::Error),
}
