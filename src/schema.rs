//! Compiled schemas and the instance API
//!
//! A [`Schema`] is the compiled, immutable form of a declaration: field rules
//! are frozen at construction and never change afterward. The instance also
//! carries the state of its latest validation run, which is what
//! [`Schema::get_validation_errors`] and [`Schema::get_body`] read. Because
//! of that state, one logical validation should own its instance (or be
//! serialized against others on the same instance); the detached async entry
//! point [`Schema::validate_async`] compiles or clones its own instance per
//! call for exactly that reason.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::compile::{self, Settings};
use crate::decl::{CustomFn, DefaultDecl, NativeType, SchemaDecl};
use crate::error::{Result, SchemaDefinitionError, UsageError, ValidateError};
use crate::plugin::{self, Plugin};
use crate::validate;

/// Resolved kind of a compiled field rule. Closed sum, dispatched
/// exhaustively by the rule engine.
#[derive(Debug, Clone)]
pub(crate) enum FieldKind {
    Native(NativeType),
    Date,
    UuidV1,
    UuidV4,
    Nested(Box<Schema>),
    Array(Option<ItemKind>),
}

/// Item type of an array rule.
#[derive(Debug, Clone)]
pub(crate) enum ItemKind {
    Native(NativeType),
    Schema(Box<Schema>),
}

/// One compiled field rule. Bounds are resolved to numbers and the regex is
/// guaranteed compiled; the compiler rejects everything else.
#[derive(Clone)]
pub(crate) struct CompiledRule {
    pub(crate) kind: FieldKind,
    pub(crate) required: bool,
    pub(crate) default: Option<DefaultDecl>,
    pub(crate) enum_values: Option<Vec<String>>,
    pub(crate) pattern: Option<Regex>,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) custom: Option<CustomFn>,
}

impl fmt::Debug for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("enum_values", &self.enum_values)
            .field("pattern", &self.pattern)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("custom", &self.custom.as_ref().map(|_| ".."))
            .finish()
    }
}

/// A named compiled field, kept in declaration order.
#[derive(Debug, Clone)]
pub(crate) struct CompiledField {
    pub(crate) name: String,
    pub(crate) rule: CompiledRule,
}

/// Transient state of one validation run.
#[derive(Debug, Clone)]
struct RunState {
    errors: Vec<String>,
    body: Value,
}

/// A compiled schema plus the state of its latest validation run.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) fields: Vec<CompiledField>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) strict: bool,
    last_run: Option<RunState>,
}

impl Schema {
    /// Compile a declaration with default settings (strict mode on)
    pub fn compile(decl: SchemaDecl) -> Result<Self> {
        compile::compile_schema(decl, Settings::default())
    }

    /// Compile a declaration with explicit settings. A `strict` toggle
    /// inside the declaration overrides the settings value.
    pub fn compile_with(decl: SchemaDecl, settings: Settings) -> Result<Self> {
        compile::compile_schema(decl, settings)
    }

    pub(crate) fn from_parts(
        fields: Vec<CompiledField>,
        index: HashMap<String, usize>,
        strict: bool,
    ) -> Self {
        Self {
            fields,
            index,
            strict,
            last_run: None,
        }
    }

    /// Whether undeclared input fields are validation errors
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Number of declared fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Declared field names, in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Register a plugin with the process-wide registry
    pub fn extend(plugin: Arc<dyn Plugin>) {
        plugin::register(plugin);
    }

    /// Register a batch of plugins, preserving their order
    pub fn extend_all(plugins: impl IntoIterator<Item = Arc<dyn Plugin>>) {
        plugin::register_all(plugins);
    }

    /// Validate `data` against this schema.
    ///
    /// Never fails for malformed data: every problem is accumulated in an
    /// ordered error list readable through
    /// [`get_validation_errors`](Self::get_validation_errors). Fields with
    /// declared defaults are written into `data` in place when absent; the
    /// body returned by [`get_body`](Self::get_body) is an owned snapshot
    /// taken after default application. Each call replaces the previous
    /// run's results.
    pub fn validate(&mut self, data: &mut Value) -> bool {
        plugin::each(|p| p.before_validate(data));

        let mut errors = validate::run(self, data);
        plugin::each(|p| p.after_validate(data, &mut errors));

        let ok = errors.is_empty();
        tracing::debug!(errors = errors.len(), ok, "validation run finished");
        self.last_run = Some(RunState {
            errors,
            body: data.clone(),
        });
        ok
    }

    /// Errors accumulated by the latest run, in emission order.
    ///
    /// Fails with [`UsageError`] if no run has ever happened on this
    /// instance. Registered plugins may rewrite the list as it is fetched.
    pub fn get_validation_errors(&mut self) -> std::result::Result<&[String], UsageError> {
        let run = self.last_run.as_mut().ok_or(UsageError)?;
        plugin::each(|p| p.on_get_errors(&mut run.errors));
        Ok(&run.errors)
    }

    /// A copy of the latest run's data.
    ///
    /// With `include_all` false on a non-strict schema, keys not declared in
    /// the schema are stripped. With `order_body` true, declared keys come
    /// first in declaration order, followed by the remaining keys in their
    /// input order.
    pub fn get_body(
        &self,
        include_all: bool,
        order_body: bool,
    ) -> std::result::Result<Value, UsageError> {
        let run = self.last_run.as_ref().ok_or(UsageError)?;
        Ok(self.body_view(&run.body, include_all, order_body))
    }

    fn body_view(&self, body: &Value, include_all: bool, order_body: bool) -> Value {
        let Some(obj) = body.as_object() else {
            return body.clone();
        };

        let mut keep = obj.clone();
        if !include_all && !self.strict {
            keep.retain(|key, _| self.index.contains_key(key));
        }

        if !order_body {
            return Value::Object(keep);
        }

        let mut ordered = serde_json::Map::with_capacity(keep.len());
        for field in &self.fields {
            if let Some(value) = keep.remove(&field.name) {
                ordered.insert(field.name.clone(), value);
            }
        }
        for (key, value) in keep {
            ordered.insert(key, value);
        }
        Value::Object(ordered)
    }

    /// Detached, await-friendly validation.
    ///
    /// Performs no concurrent work: it runs the synchronous validator on an
    /// instance of its own (compiled from a declaration or cloned from an
    /// existing schema) and settles with the filtered, ordered body on
    /// success or the full error list on failure.
    pub async fn validate_async(
        mut data: Value,
        target: impl IntoSchema,
        include_all: bool,
        order_body: bool,
    ) -> std::result::Result<Value, ValidateError> {
        let mut schema = target.into_schema()?;
        if schema.validate(&mut data) {
            Ok(schema.get_body(include_all, order_body).unwrap_or_default())
        } else {
            let errors = schema
                .get_validation_errors()
                .map(|errors| errors.to_vec())
                .unwrap_or_default();
            Err(ValidateError::Invalid(errors))
        }
    }
}

impl TryFrom<SchemaDecl> for Schema {
    type Error = SchemaDefinitionError;

    fn try_from(decl: SchemaDecl) -> Result<Self> {
        Schema::compile(decl)
    }
}

/// Anything the detached entry point accepts as its schema argument: an
/// owned schema, a borrowed one (cloned), or a raw declaration compiled on
/// the spot.
pub trait IntoSchema {
    fn into_schema(self) -> Result<Schema>;
}

impl IntoSchema for Schema {
    fn into_schema(self) -> Result<Schema> {
        Ok(self)
    }
}

impl IntoSchema for &Schema {
    fn into_schema(self) -> Result<Schema> {
        Ok(self.clone())
    }
}

impl IntoSchema for SchemaDecl {
    fn into_schema(self) -> Result<Schema> {
        Schema::compile(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> Schema {
        Schema::compile(
            SchemaDecl::new()
                .field("lastname", NativeType::String)
                .field("name", NativeType::String),
        )
        .expect("schema compiles")
    }

    #[test]
    fn test_errors_before_any_run_is_a_usage_error() {
        let mut schema = person_schema();
        assert_eq!(schema.get_validation_errors(), Err(UsageError));
        assert!(schema.get_body(true, true).is_err());
    }

    #[test]
    fn test_run_results_are_replaced() {
        let mut schema = person_schema();
        let mut bad = json!({ "name": 1, "lastname": "Lastname" });
        assert!(!schema.validate(&mut bad));
        assert_eq!(schema.get_validation_errors().unwrap().len(), 1);

        let mut good = json!({ "name": "Name", "lastname": "Lastname" });
        assert!(schema.validate(&mut good));
        assert!(schema.get_validation_errors().unwrap().is_empty());
    }

    #[test]
    fn test_body_keeps_input_order_unless_ordered() {
        let mut schema = person_schema();
        let mut data = json!({ "name": "Name", "lastname": "Lastname" });
        assert!(schema.validate(&mut data));

        let body = schema.get_body(false, false).unwrap();
        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "lastname"]);

        let body = schema.get_body(true, true).unwrap();
        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["lastname", "name"]);
    }
}
