//! Array rules: untyped arrays, native-typed items, schema-typed items, and
//! length bounds. Item failures are one aggregate error per field.

use serde_json::json;
use shapecheck::{NativeType, RuleDecl, Schema, SchemaDecl, TypeSpec};

#[test]
fn auto_parses_inline_schemas_inside_arrays() {
    let mut schema = Schema::compile(SchemaDecl::new().field(
        "products",
        RuleDecl::of(TypeSpec::array_of(
            SchemaDecl::new().field("price", NativeType::Number),
        )),
    ))
    .unwrap();
    assert!(schema.validate(&mut json!({ "products": [{ "price": 1 }] })));
}

#[test]
fn rejects_a_non_array_value_with_a_typed_item() {
    let mut schema = Schema::compile(SchemaDecl::new().field(
        "something",
        RuleDecl::of(TypeSpec::array_of(NativeType::String)),
    ))
    .unwrap();
    assert!(!schema.validate(&mut json!({ "something": "not an array" })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["Property something is string, expected array".to_string()].as_slice()
    );
}

#[test]
fn rejects_a_non_array_value_on_an_untyped_array() {
    let mut schema = Schema::compile(
        SchemaDecl::new().field("titles", RuleDecl::of(TypeSpec::any_array()).required()),
    )
    .unwrap();
    assert!(!schema.validate(&mut json!({ "titles": "not an array" })));
}

#[test]
fn accepts_mixed_items_on_an_untyped_array() {
    let mut schema = Schema::compile(
        SchemaDecl::new().field("titles", RuleDecl::of(TypeSpec::any_array()).required()),
    )
    .unwrap();
    assert!(schema.validate(&mut json!({ "titles": [1, "two", true] })));
}

#[test]
fn rejects_an_item_of_the_wrong_native_type() {
    let mut schema = Schema::compile(SchemaDecl::new().field(
        "titles",
        RuleDecl::of(TypeSpec::array_of(NativeType::String)).required(),
    ))
    .unwrap();
    assert!(!schema.validate(&mut json!({ "titles": ["string", 1] })));
    // one aggregate error for the field, not one per offending item
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["An item in array of property titles is not valid. All items must be of type string"
            .to_string()]
        .as_slice()
    );
}

#[test]
fn validates_items_against_a_schema_instance() {
    let product = Schema::compile(
        SchemaDecl::new().field("price", RuleDecl::of(NativeType::Number).required()),
    )
    .unwrap();
    let mut schema = Schema::compile(
        SchemaDecl::new().field("products", RuleDecl::of(TypeSpec::array_of(product))),
    )
    .unwrap();
    assert!(schema.validate(&mut json!({ "products": [{ "price": 1 }] })));
}

#[test]
fn rejects_an_item_failing_its_schema() {
    let product = Schema::compile(
        SchemaDecl::new().field("price", RuleDecl::of(NativeType::Number).required()),
    )
    .unwrap();
    let mut schema = Schema::compile(
        SchemaDecl::new().field("products", RuleDecl::of(TypeSpec::array_of(product))),
    )
    .unwrap();
    assert!(!schema.validate(&mut json!({ "products": [{ "price": "abc" }] })));
    assert_eq!(schema.get_validation_errors().unwrap().len(), 1);
}

#[test]
fn rejects_fewer_items_than_min() {
    let mut schema = Schema::compile(
        SchemaDecl::new().field("items", RuleDecl::of(TypeSpec::any_array()).required().min(1)),
    )
    .unwrap();
    // an empty required array is present, so the length bound applies
    assert!(!schema.validate(&mut json!({ "items": [] })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["Property items must contain at least 1 items".to_string()].as_slice()
    );
}

#[test]
fn rejects_more_items_than_max() {
    let mut schema = Schema::compile(
        SchemaDecl::new().field("items", RuleDecl::of(TypeSpec::any_array()).max(2)),
    )
    .unwrap();
    assert!(!schema.validate(&mut json!({ "items": [1, 2, 3] })));
}
