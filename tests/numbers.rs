//! Numeric rules: type mismatch reporting and min/max bounds.

use serde_json::json;
use shapecheck::{NativeType, RuleDecl, Schema, SchemaDecl};

fn age_schema(rule: RuleDecl) -> Schema {
    Schema::compile(SchemaDecl::new().field("age", rule)).expect("schema compiles")
}

#[test]
fn rejects_a_string_on_a_number_field() {
    let mut schema = age_schema(RuleDecl::of(NativeType::Number).required());
    assert!(!schema.validate(&mut json!({ "age": "21" })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["Property age is string, expected number".to_string()].as_slice()
    );
}

#[test]
fn rejects_a_number_above_max() {
    let mut schema = age_schema(RuleDecl::of(NativeType::Number).max(18));
    assert!(!schema.validate(&mut json!({ "age": 21 })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["Property age must be at most 18".to_string()].as_slice()
    );
}

#[test]
fn rejects_a_number_below_min() {
    let mut schema = age_schema(RuleDecl::of(NativeType::Number).min(18));
    assert!(!schema.validate(&mut json!({ "age": 8 })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["Property age must be at least 18".to_string()].as_slice()
    );
}

#[test]
fn passes_a_number_within_bounds() {
    let mut schema = age_schema(RuleDecl::of(NativeType::Number).min(18).max(50));
    assert!(schema.validate(&mut json!({ "age": 21 })));
    assert!(schema.get_validation_errors().unwrap().is_empty());
}

#[test]
fn bounds_apply_to_fractional_values() {
    let mut schema = age_schema(RuleDecl::of(NativeType::Number).min(18));
    assert!(!schema.validate(&mut json!({ "age": 17.5 })));
    assert!(schema.validate(&mut json!({ "age": 18.0 })));
}
