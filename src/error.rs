//! Error types for schema compilation and validation

use thiserror::Error;

/// Result type for schema compilation
pub type Result<T> = std::result::Result<T, SchemaDefinitionError>;

/// A schema declaration that is itself malformed.
///
/// These surface at construction time, never during validation: data
/// problems are accumulated as strings on the schema instance instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    #[error("Property {field} has no type defined")]
    MissingType { field: String },

    #[error("Unsupported type on {field}: {tag}")]
    UnsupportedType { field: String, tag: String },

    #[error("Invalid schema for {field}: array items must be declared of at most one type")]
    AmbiguousArrayItem { field: String },

    #[error("Invalid schema for {field}: regex and enum can be set only for strings")]
    RuleOnlyForStrings { field: String },

    #[error("Invalid schema for {field}: regex must be a compiled pattern")]
    UncompiledRegex { field: String },

    #[error("Invalid schema for {field}: {bound} property must be a number")]
    NonNumericBound { field: String, bound: &'static str },
}

/// Accessor called out of order: results were requested before any
/// `validate` call ever ran on the instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validate must be called before requesting validation results")]
pub struct UsageError;

/// Failure of the detached async entry point.
#[derive(Error, Debug)]
pub enum ValidateError {
    /// The declaration passed in could not be compiled.
    #[error(transparent)]
    Definition(#[from] SchemaDefinitionError),

    /// The data failed validation; carries the full ordered error list.
    #[error("validation failed with {} error(s)", .0.len())]
    Invalid(Vec<String>),
}
