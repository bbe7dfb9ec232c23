//! Raw schema declarations
//!
//! A [`SchemaDecl`] is the caller-facing description of a schema: an ordered
//! list of field declarations, each either a full [`RuleDecl`] or a shorthand
//! type. Declarations are inert until compiled into a [`Schema`]; all
//! consistency checking happens at compile time.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::schema::Schema;

/// The closed set of primitive kinds a field can require.
///
/// Replaces runtime probing of type tags: the kind is resolved once at
/// compile time and matched against the value's JSON type during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeType {
    Boolean,
    String,
    Number,
    Object,
}

impl NativeType {
    /// Human-readable tag used in mismatch messages
    pub fn tag(&self) -> &'static str {
        match self {
            NativeType::Boolean => "boolean",
            NativeType::String => "string",
            NativeType::Number => "number",
            NativeType::Object => "object",
        }
    }

    /// Whether a value carries this kind's runtime tag
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (NativeType::Boolean, Value::Bool(_))
                | (NativeType::String, Value::String(_))
                | (NativeType::Number, Value::Number(_))
                | (NativeType::Object, Value::Object(_))
        )
    }
}

/// Runtime tag of a JSON value, used in mismatch messages
pub fn value_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Type descriptor of a field declaration.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A primitive kind: boolean, string, number, or generic object
    Native(NativeType),
    /// String tag such as `"uuid/v1"` or `"uuid/v4"`; unknown tags are
    /// rejected at compile time
    Tag(String),
    /// A calendar date, given as a parseable string or millisecond timestamp
    Date,
    /// A nested, already-compiled schema
    Schema(Schema),
    /// A nested inline declaration, compiled recursively
    Inline(SchemaDecl),
    /// An array; the single element, if present, describes the item type.
    /// More than one element is a definition error.
    Array(Vec<TypeSpec>),
}

impl TypeSpec {
    /// Array of a single item type, `[T]` in the declaration shorthand
    pub fn array_of(item: impl Into<TypeSpec>) -> Self {
        TypeSpec::Array(vec![item.into()])
    }

    /// Untyped array, `[]` in the declaration shorthand
    pub fn any_array() -> Self {
        TypeSpec::Array(Vec::new())
    }
}

impl From<NativeType> for TypeSpec {
    fn from(kind: NativeType) -> Self {
        TypeSpec::Native(kind)
    }
}

impl From<&str> for TypeSpec {
    fn from(tag: &str) -> Self {
        TypeSpec::Tag(tag.to_string())
    }
}

impl From<Schema> for TypeSpec {
    fn from(schema: Schema) -> Self {
        TypeSpec::Schema(schema)
    }
}

impl From<SchemaDecl> for TypeSpec {
    fn from(decl: SchemaDecl) -> Self {
        TypeSpec::Inline(decl)
    }
}

/// Zero-argument default producer; returning `None` leaves the field unset
pub type DefaultFn = Arc<dyn Fn() -> Option<Value> + Send + Sync>;

/// Default applied when a field is absent from the input.
#[derive(Clone)]
pub enum DefaultDecl {
    /// Literal value; only string and number literals are written into data
    Literal(Value),
    /// Computed value; a producer that fails simply leaves the field unset
    Producer(DefaultFn),
}

impl fmt::Debug for DefaultDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultDecl::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            DefaultDecl::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Regex rule as declared. Only a compiled pattern is accepted; a raw
/// source string is a definition error.
#[derive(Debug, Clone)]
pub enum PatternDecl {
    Compiled(Regex),
    Source(String),
}

impl From<Regex> for PatternDecl {
    fn from(re: Regex) -> Self {
        PatternDecl::Compiled(re)
    }
}

impl From<&str> for PatternDecl {
    fn from(source: &str) -> Self {
        PatternDecl::Source(source.to_string())
    }
}

impl From<String> for PatternDecl {
    fn from(source: String) -> Self {
        PatternDecl::Source(source)
    }
}

/// Outcome of a user-supplied custom validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomOutcome {
    /// The value is acceptable
    Pass,
    /// The value is not acceptable; a generic message is recorded
    Fail,
    /// The value is not acceptable; the message is recorded verbatim
    Message(String),
}

/// Custom validator: receives the field value, the full data object, and the
/// compiled schema, and decides the outcome
pub type CustomFn = Arc<dyn Fn(&Value, &Value, &Schema) -> CustomOutcome + Send + Sync>;

/// Full rule declaration for one field.
#[derive(Clone, Default)]
pub struct RuleDecl {
    pub(crate) type_spec: Option<TypeSpec>,
    pub(crate) required: bool,
    pub(crate) default: Option<DefaultDecl>,
    pub(crate) enum_values: Option<Vec<String>>,
    pub(crate) pattern: Option<PatternDecl>,
    pub(crate) min: Option<Value>,
    pub(crate) max: Option<Value>,
    pub(crate) custom: Option<CustomFn>,
}

impl RuleDecl {
    /// Rule with the given type and no other constraints
    pub fn of(type_spec: impl Into<TypeSpec>) -> Self {
        Self {
            type_spec: Some(type_spec.into()),
            ..Self::default()
        }
    }

    /// Rule with no type; compilation rejects it, every field must
    /// declare one
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Mark the field required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Literal default applied when the field is absent
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultDecl::Literal(value.into()));
        self
    }

    /// Computed default applied when the field is absent
    pub fn default_with(mut self, producer: impl Fn() -> Option<Value> + Send + Sync + 'static) -> Self {
        self.default = Some(DefaultDecl::Producer(Arc::new(producer)));
        self
    }

    /// Acceptable values for a string field
    pub fn one_of(mut self, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Regex a string field must match
    pub fn pattern(mut self, pattern: impl Into<PatternDecl>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Lower bound: string length, numeric value, or array length
    pub fn min(mut self, bound: impl Into<Value>) -> Self {
        self.min = Some(bound.into());
        self
    }

    /// Upper bound: string length, numeric value, or array length
    pub fn max(mut self, bound: impl Into<Value>) -> Self {
        self.max = Some(bound.into());
        self
    }

    /// Attach a custom validator, run after the built-in rules for presence
    /// and before type checks
    pub fn custom(
        mut self,
        validator: impl Fn(&Value, &Value, &Schema) -> CustomOutcome + Send + Sync + 'static,
    ) -> Self {
        self.custom = Some(Arc::new(validator));
        self
    }
}

impl fmt::Debug for RuleDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDecl")
            .field("type_spec", &self.type_spec)
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

/// One field of a raw declaration.
#[derive(Debug, Clone)]
pub enum FieldDecl {
    /// Shorthand: a bare type descriptor, normalized to a required rule
    Type(TypeSpec),
    /// Full rule
    Rule(RuleDecl),
    /// Reserved strict-mode toggle, declared under the key `strict`
    Strict(bool),
}

impl From<RuleDecl> for FieldDecl {
    fn from(rule: RuleDecl) -> Self {
        FieldDecl::Rule(rule)
    }
}

impl From<TypeSpec> for FieldDecl {
    fn from(spec: TypeSpec) -> Self {
        FieldDecl::Type(spec)
    }
}

impl From<NativeType> for FieldDecl {
    fn from(kind: NativeType) -> Self {
        FieldDecl::Type(TypeSpec::Native(kind))
    }
}

impl From<&str> for FieldDecl {
    fn from(tag: &str) -> Self {
        FieldDecl::Type(TypeSpec::Tag(tag.to_string()))
    }
}

impl From<Schema> for FieldDecl {
    fn from(schema: Schema) -> Self {
        FieldDecl::Type(TypeSpec::Schema(schema))
    }
}

impl From<SchemaDecl> for FieldDecl {
    fn from(decl: SchemaDecl) -> Self {
        FieldDecl::Type(TypeSpec::Inline(decl))
    }
}

impl From<bool> for FieldDecl {
    fn from(strict: bool) -> Self {
        FieldDecl::Strict(strict)
    }
}

/// Ordered raw schema declaration.
///
/// Field order is declaration order and drives error ordering and
/// `get_body` ordering downstream.
#[derive(Debug, Clone, Default)]
pub struct SchemaDecl {
    /// Declared fields, in order
    pub fields: Vec<(String, FieldDecl)>,
}

impl SchemaDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field declaration
    pub fn field(mut self, name: impl Into<String>, decl: impl Into<FieldDecl>) -> Self {
        self.fields.push((name.into(), decl.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
