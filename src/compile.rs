//! The schema compiler
//!
//! Normalizes a raw [`SchemaDecl`] into a compiled [`Schema`] and rejects
//! declarations that are internally inconsistent. All checks run here, at
//! construction time; the validator assumes a well-formed schema.
//!
//! Checks are fail-fast: compilation aborts on the first malformed field in
//! declaration order.

use std::collections::HashMap;

use crate::decl::{FieldDecl, NativeType, PatternDecl, RuleDecl, SchemaDecl, TypeSpec};
use crate::error::{Result, SchemaDefinitionError};
use crate::plugin;
use crate::schema::{CompiledField, CompiledRule, FieldKind, ItemKind, Schema};

/// Construction settings.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    /// When true, input fields not declared in the schema are validation
    /// errors; when false they pass through untouched. Defaults to true.
    /// A `strict` toggle inside the declaration itself overrides this.
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { strict: true }
    }
}

pub(crate) fn compile_schema(mut decl: SchemaDecl, settings: Settings) -> Result<Schema> {
    plugin::each(|p| p.before_parse(&mut decl));

    let mut strict = settings.strict;
    let mut fields: Vec<CompiledField> = Vec::with_capacity(decl.fields.len());
    let mut index = HashMap::with_capacity(decl.fields.len());

    for (name, field) in decl.fields {
        let rule_decl = match field {
            // Reserved key: extracted into settings, not a validated field
            FieldDecl::Strict(flag) => {
                strict = flag;
                continue;
            }
            // Shorthand: a bare type descriptor means { type, required }
            FieldDecl::Type(spec) => RuleDecl::of(spec).required(),
            FieldDecl::Rule(rule) => rule,
        };

        let rule = compile_rule(&name, rule_decl)?;
        index.insert(name.clone(), fields.len());
        fields.push(CompiledField { name, rule });
    }

    let schema = Schema::from_parts(fields, index, strict);
    plugin::each(|p| p.after_parse(&schema));
    tracing::debug!(fields = schema.field_count(), strict, "schema compiled");
    Ok(schema)
}

fn compile_rule(field: &str, decl: RuleDecl) -> Result<CompiledRule> {
    let spec = decl
        .type_spec
        .ok_or_else(|| SchemaDefinitionError::MissingType { field: field.to_string() })?;

    let kind = compile_kind(field, spec)?;

    if (decl.enum_values.is_some() || decl.pattern.is_some())
        && !matches!(kind, FieldKind::Native(NativeType::String))
    {
        return Err(SchemaDefinitionError::RuleOnlyForStrings { field: field.to_string() });
    }

    let pattern = match decl.pattern {
        None => None,
        Some(PatternDecl::Compiled(re)) => Some(re),
        Some(PatternDecl::Source(_)) => {
            return Err(SchemaDefinitionError::UncompiledRegex { field: field.to_string() })
        }
    };

    let min = numeric_bound(field, "min", decl.min)?;
    let max = numeric_bound(field, "max", decl.max)?;

    Ok(CompiledRule {
        kind,
        required: decl.required,
        default: decl.default,
        enum_values: decl.enum_values,
        pattern,
        min,
        max,
        custom: decl.custom,
    })
}

fn compile_kind(field: &str, spec: TypeSpec) -> Result<FieldKind> {
    match spec {
        TypeSpec::Native(kind) => Ok(FieldKind::Native(kind)),
        TypeSpec::Date => Ok(FieldKind::Date),
        TypeSpec::Tag(tag) => match tag.to_ascii_lowercase().as_str() {
            "uuid/v1" => Ok(FieldKind::UuidV1),
            "uuid/v4" => Ok(FieldKind::UuidV4),
            _ => Err(SchemaDefinitionError::UnsupportedType {
                field: field.to_string(),
                tag,
            }),
        },
        TypeSpec::Schema(schema) => Ok(FieldKind::Nested(Box::new(schema))),
        TypeSpec::Inline(decl) => {
            let nested = compile_schema(decl, Settings::default())?;
            Ok(FieldKind::Nested(Box::new(nested)))
        }
        TypeSpec::Array(mut items) => {
            if items.len() > 1 {
                return Err(SchemaDefinitionError::AmbiguousArrayItem { field: field.to_string() });
            }
            match items.pop() {
                None => Ok(FieldKind::Array(None)),
                Some(item) => Ok(FieldKind::Array(Some(compile_item(field, item)?))),
            }
        }
    }
}

fn compile_item(field: &str, spec: TypeSpec) -> Result<ItemKind> {
    match spec {
        TypeSpec::Native(kind) => Ok(ItemKind::Native(kind)),
        TypeSpec::Schema(schema) => Ok(ItemKind::Schema(Box::new(schema))),
        TypeSpec::Inline(decl) => {
            let nested = compile_schema(decl, Settings::default())?;
            Ok(ItemKind::Schema(Box::new(nested)))
        }
        TypeSpec::Tag(tag) => Err(SchemaDefinitionError::UnsupportedType {
            field: field.to_string(),
            tag,
        }),
        TypeSpec::Date => Err(SchemaDefinitionError::UnsupportedType {
            field: field.to_string(),
            tag: "date".to_string(),
        }),
        TypeSpec::Array(_) => Err(SchemaDefinitionError::UnsupportedType {
            field: field.to_string(),
            tag: "nested array".to_string(),
        }),
    }
}

fn numeric_bound(
    field: &str,
    bound: &'static str,
    value: Option<serde_json::Value>,
) -> Result<Option<f64>> {
    match value {
        None => Ok(None),
        Some(v) => match v.as_f64() {
            Some(n) => Ok(Some(n)),
            None => Err(SchemaDefinitionError::NonNumericBound {
                field: field.to_string(),
                bound,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_is_required() {
        let schema = Schema::compile(SchemaDecl::new().field("name", NativeType::String)).unwrap();
        let mut data = serde_json::json!({});
        let mut schema = schema;
        assert!(!schema.validate(&mut data));
        assert_eq!(
            schema.get_validation_errors().unwrap(),
            ["Missing required property name".to_string()].as_slice()
        );
    }

    #[test]
    fn test_strict_key_extracted_from_fields() {
        let mut schema = Schema::compile(
            SchemaDecl::new()
                .field("title", NativeType::String)
                .field("strict", false),
        )
        .unwrap();
        assert!(!schema.strict());
        // the reserved key is not validated as a field
        let mut data = serde_json::json!({ "title": "x", "extra": 1 });
        assert!(schema.validate(&mut data));
    }

    #[test]
    fn test_tag_case_insensitive() {
        assert!(Schema::compile(SchemaDecl::new().field("id", "UUID/V4")).is_ok());
    }
}
