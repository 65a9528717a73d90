//! Structured error types for the layout engine.
//!
//! Only configuration problems are errors: a description that cannot be
//! resolved, inputs that make the column grid meaningless, or a JSON
//! request that does not parse. Degenerate geometry during layout —
//! oversize content, zero-line fields, empty clip windows — is clamped
//! internally and never surfaces here.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum GalleyError {
    /// Pagination was asked to lay out an empty record list.
    #[error("a non-empty list of records is required")]
    EmptyRecordList,

    /// The page bounds, separation, and column count produce a column
    /// with no usable width.
    #[error("column width resolves to {width:.2}pt with {columns} column(s)")]
    InvalidColumnWidth { width: f64, columns: u32 },

    /// An alignment entry refers to a field name not in the description.
    #[error("alignment refers to unknown field `{0}`")]
    UnknownField(String),

    /// Two fields in one description share a name.
    #[error("duplicate field name `{0}` in layout description")]
    DuplicateField(String),

    /// A field constrains the same edge twice.
    #[error("field `{field}` declares the {key} alignment more than once")]
    DuplicateAlignment { field: String, key: &'static str },

    /// The alignment graph contains a dependency cycle.
    #[error("alignment cycle through field `{0}`")]
    CyclicAlignment(String),

    /// Layout ran but produced no pages.
    #[error("no pages were produced")]
    NoPages,

    /// A JSON pagination request failed to parse.
    #[error("failed to parse request: {0}")]
    Parse(#[from] serde_json::Error),
}
