//! Error types for rule marshalling and template expansion.

use thiserror::Error;

/// Errors raised while marshalling a rule model.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The rule model is structurally unusable, e.g. a template value with no key.
    #[error("malformed rule model at {location}: {message}")]
    MalformedModel { location: String, message: String },

    /// The generated template could not be expanded over the row data.
    #[error(transparent)]
    Expansion(#[from] ExpandError),
}

impl MarshalError {
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        MarshalError::MalformedModel {
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the row expander.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("template text does not start with a `template header` block")]
    MissingHeader,

    #[error("template text declares no `template \"name\"` block")]
    MissingTemplate,

    #[error("template '{name}' is missing its `end template` line")]
    UnterminatedTemplate { name: String },

    #[error("unterminated directive at offset {offset}")]
    UnterminatedDirective { offset: usize },

    #[error("`@end{{}}` at offset {offset} has no matching `@if`")]
    UnmatchedEnd { offset: usize },

    #[error("`@if` opened at offset {offset} is never closed")]
    UnclosedIf { offset: usize },

    #[error("invalid condition '{condition}'")]
    InvalidCondition { condition: String },

    #[error("row {row} has {actual} cells but the template declares {expected} columns")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Result type for marshalling operations.
pub type Result<T> = std::result::Result<T, MarshalError>;
