//! shapecheck
//!
//! Declarative schema validation for JSON-shaped data at trust boundaries:
//! request bodies, configuration objects, anything structured you do not
//! control. A schema describes the expected shape of an object; validating
//! input against it yields a boolean plus a complete, ordered list of
//! human-readable errors rather than a fail-fast exception.
//!
//! ## Features
//!
//! - **Compile-time schema checking**: malformed declarations are rejected
//!   at construction, never at validation time
//! - **Recursive validation**: nested schemas and typed arrays, with dotted
//!   error paths (`Missing required property name.firstname`)
//! - **Defaults**: literal or computed defaults are written into the input
//!   before the required check
//! - **Strict mode**: undeclared input fields are errors by default, or pass
//!   through untouched when disabled
//! - **Custom validators and plugins**: per-field predicates, plus
//!   process-wide lifecycle hooks around compilation and validation
//!
//! ## Example
//!
//! ```
//! use shapecheck::{NativeType, RuleDecl, Schema, SchemaDecl};
//! use serde_json::json;
//!
//! let mut schema = Schema::compile(
//!     SchemaDecl::new()
//!         .field("title", RuleDecl::of(NativeType::String).required())
//!         .field("age", RuleDecl::of(NativeType::Number).min(18)),
//! )
//! .unwrap();
//!
//! let mut data = json!({ "title": "something", "age": 21 });
//! assert!(schema.validate(&mut data));
//!
//! let mut bad = json!({ "age": 8 });
//! assert!(!schema.validate(&mut bad));
//! assert_eq!(
//!     schema.get_validation_errors().unwrap(),
//!     [
//!         "Missing required property title".to_string(),
//!         "Property age must be at least 18".to_string(),
//!     ]
//!     .as_slice()
//! );
//! ```
//!
//! Optional fields whose value is empty under the falsy test (`""`, `0`,
//! `[]`) skip all further rule checks, the same as absent fields. This is a
//! documented property of the engine, not an accident.

pub mod compile;
pub mod decl;
pub mod error;
pub mod plugin;
pub mod schema;

mod validate;

pub use compile::Settings;
pub use decl::{
    CustomFn, CustomOutcome, DefaultDecl, FieldDecl, NativeType, PatternDecl, RuleDecl, SchemaDecl,
    TypeSpec,
};
pub use error::{Result, SchemaDefinitionError, UsageError, ValidateError};
pub use plugin::Plugin;
pub use schema::{IntoSchema, Schema};
