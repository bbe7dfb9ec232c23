//! The recursive rule engine
//!
//! Walks a data object against a compiled schema, applying defaults,
//! recursing into nested schemas and arrays, and accumulating every error
//! rather than failing fast. Errors are emitted in a fixed order:
//! unknown-property errors first (in input key order), then per-field errors
//! in schema declaration order.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::decl::{value_tag, CustomOutcome, DefaultDecl};
use crate::schema::{CompiledField, CompiledRule, FieldKind, ItemKind, Schema};

// uuid/v1 is deliberately loose: an unanchored 8-4-4-4-12 hex grouping with
// no version nibble. uuid/v4 enforces the RFC 4122 version and variant
// nibbles. The asymmetry is part of the contract.
static UUID_V1: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z0-9]{8}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{4}-[a-z0-9]{12}")
        .expect("uuid/v1 pattern")
});

static UUID_V4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid/v4 pattern")
});

/// Run every rule of `schema` against `data`, returning the full ordered
/// error list. Writes defaulted fields into `data` in place.
pub(crate) fn run(schema: &Schema, data: &mut Value) -> Vec<String> {
    let mut errors = Vec::new();

    if !data.is_object() {
        errors.push("Cannot validate empty object".to_string());
        return errors;
    }

    if schema.strict {
        if let Some(obj) = data.as_object() {
            for key in obj.keys() {
                if !schema.index.contains_key(key) {
                    errors.push(format!("Property {key} not valid in schema"));
                }
            }
        }
    }

    for field in &schema.fields {
        check_field(schema, field, data, &mut errors);
    }

    errors
}

fn check_field(schema: &Schema, field: &CompiledField, data: &mut Value, errors: &mut Vec<String>) {
    let name = field.name.as_str();
    let rule = &field.rule;

    // Default application, before the required check
    if let Some(default) = &rule.default {
        let unset = data.get(name).map_or(true, Value::is_null);
        if unset {
            if let Some(value) = produce_default(default) {
                if let Some(obj) = data.as_object_mut() {
                    obj.insert(name.to_string(), value);
                }
            }
        }
    }

    let present = data.get(name).is_some_and(|v| !v.is_null());

    if rule.required && !present {
        errors.push(format!("Missing required property {name}"));
        return;
    }

    if !present {
        return;
    }

    // An optional value that is empty under the falsy test ("" / 0 / [])
    // skips all remaining checks, same as an absent one. Contractual
    // behavior, see the crate docs.
    if !rule.required && data.get(name).is_some_and(is_empty_value) {
        return;
    }

    if let Some(custom) = &rule.custom {
        let outcome = match data.get(name) {
            Some(value) => custom(value, data, schema),
            None => CustomOutcome::Pass,
        };
        match outcome {
            CustomOutcome::Pass => {}
            CustomOutcome::Fail => {
                errors.push(format!("Custom validation failed for property {name}"));
            }
            CustomOutcome::Message(message) => errors.push(message),
        }
    }

    match &rule.kind {
        FieldKind::Native(kind) => {
            let Some(value) = data.get(name) else { return };
            if !kind.matches(value) {
                errors.push(format!(
                    "Property {name} is {}, expected {}",
                    value_tag(value),
                    kind.tag()
                ));
                return;
            }
            match value {
                Value::String(s) => check_string(name, rule, s, errors),
                Value::Number(n) => {
                    if let Some(v) = n.as_f64() {
                        check_number_bounds(name, rule, v, errors);
                    }
                }
                _ => {}
            }
        }

        FieldKind::Date => {
            let Some(value) = data.get(name) else { return };
            if !is_valid_date(value) {
                errors.push(format!("Property {name} is not a valid date"));
            }
        }

        FieldKind::UuidV1 => {
            let ok = data
                .get(name)
                .and_then(Value::as_str)
                .is_some_and(|s| UUID_V1.is_match(s));
            if !ok {
                errors.push(format!("{name} is not a valid uuid/v1"));
            }
        }

        FieldKind::UuidV4 => {
            let ok = data
                .get(name)
                .and_then(Value::as_str)
                .is_some_and(|s| UUID_V4.is_match(s));
            if !ok {
                errors.push(format!("{name} is not a valid uuid/v4"));
            }
        }

        FieldKind::Nested(nested) => {
            let Some(sub) = data.get_mut(name) else { return };
            if sub.is_object() {
                for error in run(nested, sub) {
                    errors.push(prefix_nested(name, error));
                }
            } else {
                errors.push(format!(
                    "Property {name} is {}, expected object",
                    value_tag(sub)
                ));
            }
        }

        FieldKind::Array(item) => {
            let items = match data.get_mut(name) {
                Some(Value::Array(items)) => items,
                Some(other) => {
                    errors.push(format!(
                        "Property {name} is {}, expected array",
                        value_tag(other)
                    ));
                    return;
                }
                None => return,
            };
            if let Some(min) = rule.min {
                if (items.len() as f64) < min {
                    errors.push(format!("Property {name} must contain at least {min} items"));
                }
            }
            if let Some(max) = rule.max {
                if (items.len() as f64) > max {
                    errors.push(format!("Property {name} must contain at most {max} items"));
                }
            }
            match item {
                None => {}
                Some(ItemKind::Native(kind)) => {
                    // One aggregate error for the field, not one per item
                    if items.iter().any(|item| !kind.matches(item)) {
                        errors.push(format!(
                            "An item in array of property {name} is not valid. All items must be of type {}",
                            kind.tag()
                        ));
                    }
                }
                Some(ItemKind::Schema(nested)) => {
                    let any_invalid = items.iter_mut().any(|item| !run(nested, item).is_empty());
                    if any_invalid {
                        errors.push(format!(
                            "An item in array of property {name} is not valid. All items must be of type object"
                        ));
                    }
                }
            }
        }
    }
}

fn check_string(name: &str, rule: &CompiledRule, s: &str, errors: &mut Vec<String>) {
    if let Some(values) = &rule.enum_values {
        if !values.iter().any(|v| v == s) {
            errors.push(format!("{name} not in acceptable values"));
        }
    }
    if let Some(pattern) = &rule.pattern {
        if !pattern.is_match(s) {
            errors.push(format!("Regex validation failed for key {name}"));
        }
    }
    let length = s.chars().count() as f64;
    if let Some(min) = rule.min {
        if length < min {
            errors.push(format!("Property {name} must contain at least {min} characters"));
        }
    }
    if let Some(max) = rule.max {
        if length > max {
            errors.push(format!("Property {name} must contain at most {max} characters"));
        }
    }
}

fn check_number_bounds(name: &str, rule: &CompiledRule, value: f64, errors: &mut Vec<String>) {
    if let Some(min) = rule.min {
        if value < min {
            errors.push(format!("Property {name} must be at least {min}"));
        }
    }
    if let Some(max) = rule.max {
        if value > max {
            errors.push(format!("Property {name} must be at most {max}"));
        }
    }
}

fn produce_default(default: &DefaultDecl) -> Option<Value> {
    match default {
        // Only scalar string/number literals are written back
        DefaultDecl::Literal(value @ (Value::String(_) | Value::Number(_))) => Some(value.clone()),
        DefaultDecl::Literal(_) => None,
        DefaultDecl::Producer(producer) => producer(),
    }
}

/// Falsy test for present-but-empty optional values. Null is handled by the
/// presence check before this runs.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Splice a parent field name into a nested error's `…roperty ` prefix so
/// nested paths read dotted: `Missing required property name.firstname`.
/// Messages without the prefix pass through unchanged.
fn prefix_nested(field: &str, message: String) -> String {
    match message.find("roperty ") {
        Some(idx) => {
            let at = idx + "roperty ".len();
            format!("{}{}.{}", &message[..at], field, &message[at..])
        }
        None => message,
    }
}

fn is_valid_date(value: &Value) -> bool {
    match value {
        Value::String(s) => parse_date_string(s),
        // Unix millisecond timestamp; out-of-range and fractional values
        // are rejected
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .is_some(),
        _ => false,
    }
}

fn parse_date_string(s: &str) -> bool {
    DateTime::parse_from_rfc2822(s).is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
