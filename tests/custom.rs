//! Custom validators: a message outcome is recorded verbatim, a plain fail
//! records a generic message, a pass records nothing.

use serde_json::json;
use shapecheck::{CustomOutcome, NativeType, RuleDecl, Schema, SchemaDecl};

fn name_schema(
    custom: impl Fn(&serde_json::Value, &serde_json::Value, &Schema) -> CustomOutcome
        + Send
        + Sync
        + 'static,
) -> Schema {
    Schema::compile(
        SchemaDecl::new().field("name", RuleDecl::of(NativeType::String).custom(custom)),
    )
    .expect("schema compiles")
}

#[test]
fn a_message_outcome_is_recorded_verbatim() {
    let mut schema = name_schema(|value, _, _| {
        if *value == "correct" {
            CustomOutcome::Pass
        } else {
            CustomOutcome::Message("Name is incorrect".to_string())
        }
    });
    assert!(!schema.validate(&mut json!({ "name": "incorrect" })));
    assert_eq!(
        schema.get_validation_errors().unwrap()[0],
        "Name is incorrect"
    );
}

#[test]
fn a_fail_outcome_records_a_generic_message() {
    let mut schema = name_schema(|value, _, _| {
        if *value == "correct" {
            CustomOutcome::Pass
        } else {
            CustomOutcome::Fail
        }
    });
    assert!(!schema.validate(&mut json!({ "name": "incorrect" })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["Custom validation failed for property name".to_string()].as_slice()
    );
}

#[test]
fn a_pass_outcome_validates() {
    let mut schema = name_schema(|value, _, _| {
        if *value == "correct" {
            CustomOutcome::Pass
        } else {
            CustomOutcome::Fail
        }
    });
    assert!(schema.validate(&mut json!({ "name": "correct" })));
}

#[test]
fn custom_validators_see_the_full_data_object() {
    let mut schema = Schema::compile(
        SchemaDecl::new()
            .field("password", RuleDecl::of(NativeType::String).required())
            .field(
                "confirm",
                RuleDecl::of(NativeType::String).required().custom(|value, data, _| {
                    if value == &data["password"] {
                        CustomOutcome::Pass
                    } else {
                        CustomOutcome::Message("confirm does not match password".to_string())
                    }
                }),
            ),
    )
    .unwrap();

    assert!(schema.validate(&mut json!({ "password": "s3cret", "confirm": "s3cret" })));
    assert!(!schema.validate(&mut json!({ "password": "s3cret", "confirm": "other" })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        ["confirm does not match password".to_string()].as_slice()
    );
}

#[test]
fn custom_runs_in_addition_to_builtin_rules() {
    let mut schema = Schema::compile(
        SchemaDecl::new().field(
            "name",
            RuleDecl::of(NativeType::String).custom(|_, _, _| CustomOutcome::Fail),
        ),
    )
    .unwrap();
    // custom fires first, then the type mismatch is still reported
    assert!(!schema.validate(&mut json!({ "name": 1 })));
    assert_eq!(
        schema.get_validation_errors().unwrap(),
        [
            "Custom validation failed for property name".to_string(),
            "Property name is number, expected string".to_string(),
        ]
        .as_slice()
    );
}
