//! Variable value validation
//!
//! Bound argument values arrive as JSON, but must line up with the GraphQL
//! type the schema declares for the argument. This walks a value and its
//! declared type together, rebuilding the value as it goes so the variables
//! mapping handed to the client is exactly the validated shape.

use apollo_compiler::{Schema, ast::Type, schema::ExtendedType};
use serde_json::{Map, Value};

use crate::{custom_scalar_map::CustomScalarMap, errors::SynthesisError};

/// Render a GraphQL type the way it appears in a document, e.g. `[ID!]!`.
pub(super) fn type_text(ty: &Type) -> String {
    match ty {
        Type::Named(name) => name.to_string(),
        Type::NonNullNamed(name) => format!("{name}!"),
        Type::List(inner) => format!("[{}]", type_text(inner)),
        Type::NonNullList(inner) => format!("[{}]!", type_text(inner)),
    }
}

/// Validate a bound value against its declared type, returning the value to
/// place in the variables mapping.
pub(super) fn coerce(
    value: &Value,
    ty: &Type,
    schema: &Schema,
    custom_scalars: Option<&CustomScalarMap>,
    path: &str,
) -> Result<Value, SynthesisError> {
    if value.is_null() {
        return if ty.is_non_null() {
            Err(malformed(path, ty, "null is not allowed here"))
        } else {
            Ok(Value::Null)
        };
    }

    match ty {
        Type::List(inner) | Type::NonNullList(inner) => match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    coerce(
                        item,
                        inner,
                        schema,
                        custom_scalars,
                        &format!("{path}[{index}]"),
                    )
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            _ => Err(malformed(path, ty, "expected a list value")),
        },
        Type::Named(name) | Type::NonNullNamed(name) => {
            coerce_named(value, name.as_str(), ty, schema, custom_scalars, path)
        }
    }
}

fn coerce_named(
    value: &Value,
    name: &str,
    ty: &Type,
    schema: &Schema,
    custom_scalars: Option<&CustomScalarMap>,
    path: &str,
) -> Result<Value, SynthesisError> {
    match name {
        "String" => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(malformed(path, ty, "expected a string")),
        },
        // The ID scalar accepts both strings and integers
        "ID" => match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(number) if number.is_i64() || number.is_u64() => Ok(value.clone()),
            _ => Err(malformed(path, ty, "expected a string or integer ID")),
        },
        // Int is a signed 32-bit integer per the GraphQL spec
        "Int" => match value.as_i64() {
            Some(int) if i32::try_from(int).is_ok() => Ok(value.clone()),
            Some(_) => Err(malformed(path, ty, "integer out of Int range")),
            None => Err(malformed(path, ty, "expected an integer")),
        },
        "Float" => match value {
            Value::Number(_) => Ok(value.clone()),
            _ => Err(malformed(path, ty, "expected a number")),
        },
        "Boolean" => match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(malformed(path, ty, "expected a boolean")),
        },
        other => match schema.types.get(other) {
            Some(ExtendedType::Enum(enum_type)) => match value.as_str() {
                Some(member) if enum_type.values.contains_key(member) => Ok(value.clone()),
                Some(member) => Err(malformed(
                    path,
                    ty,
                    format!("{member} is not a value of enum {other}"),
                )),
                None => Err(malformed(path, ty, "expected an enum value string")),
            },
            Some(ExtendedType::InputObject(input)) => match value {
                Value::Object(fields) => {
                    coerce_input_object(fields, input, ty, schema, custom_scalars, path)
                }
                _ => Err(malformed(path, ty, "expected an input object")),
            },
            Some(ExtendedType::Scalar(_)) => match custom_scalars.and_then(|map| map.get(other)) {
                Some(shape) if shape.matches(value) => Ok(value.clone()),
                Some(shape) => Err(malformed(path, ty, format!("expected {shape:?} shape"))),
                None => Err(SynthesisError::UnsupportedType {
                    path: path.to_string(),
                    ty: type_text(ty),
                }),
            },
            // Output types are not usable in argument position, and a
            // validated schema resolves every name reachable from one
            _ => Err(SynthesisError::UnsupportedType {
                path: path.to_string(),
                ty: type_text(ty),
            }),
        },
    }
}

fn coerce_input_object(
    fields: &Map<String, Value>,
    input: &apollo_compiler::schema::InputObjectType,
    ty: &Type,
    schema: &Schema,
    custom_scalars: Option<&CustomScalarMap>,
    path: &str,
) -> Result<Value, SynthesisError> {
    if let Some(unknown) = fields
        .keys()
        .find(|key| !input.fields.contains_key(key.as_str()))
    {
        return Err(malformed(
            path,
            ty,
            format!("no such field {unknown} on {}", input.name),
        ));
    }

    let mut coerced = Map::new();
    for (field_name, field) in input.fields.iter() {
        match fields.get(field_name.as_str()) {
            Some(field_value) => {
                let nested = coerce(
                    field_value,
                    &field.ty,
                    schema,
                    custom_scalars,
                    &format!("{path}.{field_name}"),
                )?;
                coerced.insert(field_name.to_string(), nested);
            }
            None if field.is_required() => {
                return Err(malformed(
                    path,
                    ty,
                    format!("missing required field {field_name}"),
                ));
            }
            // Absent optional fields stay absent, never null
            None => {}
        }
    }
    Ok(Value::Object(coerced))
}

fn malformed(path: &str, ty: &Type, reason: impl Into<String>) -> SynthesisError {
    SynthesisError::MalformedInput {
        path: path.to_string(),
        ty: type_text(ty),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr as _, sync::LazyLock};

    use apollo_compiler::{Schema, ast::Type, schema::ExtendedType, validation::Valid};
    use rstest::rstest;
    use serde_json::json;

    use super::{coerce, type_text};
    use crate::custom_scalar_map::CustomScalarMap;

    static SCHEMA: LazyLock<Valid<Schema>> = LazyLock::new(|| {
        Schema::parse(
            r#"
                type Query { placeholder: Int }

                scalar Timestamp

                enum EggStyle { SOFT HARD }

                input CookEggInput {
                    minutes: Int!
                    style: EggStyle
                    note: String
                }

                input BatchInput {
                    eggs: [CookEggInput!]!
                    startedAt: Timestamp
                }

                # One field per declared type exercised by the tests below
                input Shapes {
                    int: Int
                    intRequired: Int!
                    float: Float
                    string: String
                    boolean: Boolean
                    id: ID
                    style: EggStyle
                    ints: [Int]
                    intsInner: [Int!]
                    intsRequired: [Int!]!
                    ids: [ID!]
                    nested: [[EggStyle]!]!
                    egg: CookEggInput
                    batch: BatchInput!
                    at: Timestamp
                }
            "#,
            "schema.graphql",
        )
        .expect("schema should parse")
        .validate()
        .expect("schema should be valid")
    });

    /// Declared type of a field on the Shapes input above
    fn shape(field: &str) -> Type {
        match SCHEMA.types.get("Shapes") {
            Some(ExtendedType::InputObject(input)) => input
                .fields
                .get(field)
                .map(|field| Type::clone(&field.ty))
                .expect("field should be declared on Shapes"),
            _ => unreachable!("Shapes should be an input object"),
        }
    }

    #[rstest]
    #[case("int", json!(4))]
    #[case("intRequired", json!(-7))]
    #[case("float", json!(2.5))]
    #[case("float", json!(3))]
    #[case("string", json!("soft"))]
    #[case("boolean", json!(true))]
    #[case("id", json!("egg:1"))]
    #[case("id", json!(42))]
    #[case("style", json!("SOFT"))]
    #[case("intsRequired", json!([1, 2, 3]))]
    #[case("ints", json!([1, null, 3]))]
    fn accepts_well_shaped_values(#[case] field: &str, #[case] value: serde_json::Value) {
        let coerced = coerce(&value, &shape(field), &SCHEMA, None, "value").unwrap();
        assert_eq!(coerced, value);
    }

    #[rstest]
    #[case("int", json!(2.5))]
    #[case("int", json!(3000000000_i64))]
    #[case("int", json!("4"))]
    #[case("string", json!(4))]
    #[case("boolean", json!("true"))]
    #[case("id", json!(1.5))]
    #[case("intRequired", json!(null))]
    #[case("intsInner", json!([1, null]))]
    #[case("int", json!([4]))]
    #[case("style", json!("RAW"))]
    #[case("style", json!(1))]
    fn rejects_malformed_values(#[case] field: &str, #[case] value: serde_json::Value) {
        let error = coerce(&value, &shape(field), &SCHEMA, None, "value").unwrap_err();
        assert!(matches!(
            error,
            crate::errors::SynthesisError::MalformedInput { .. }
        ));
    }

    #[test]
    fn nested_input_object_round_trips() {
        let value = json!({
            "eggs": [
                {"minutes": 4, "style": "SOFT"},
                {"minutes": 9}
            ]
        });
        let coerced = coerce(&value, &shape("batch"), &SCHEMA, None, "batch").unwrap();
        assert_eq!(coerced, value);
    }

    #[test]
    fn missing_required_input_field() {
        let error =
            coerce(&json!({"style": "HARD"}), &shape("egg"), &SCHEMA, None, "eggOp").unwrap_err();
        insta::assert_snapshot!(
            error,
            @"Value at eggOp does not match declared type CookEggInput: missing required field minutes"
        );
    }

    #[test]
    fn undeclared_input_field() {
        let error = coerce(
            &json!({"minutes": 4, "salt": true}),
            &shape("egg"),
            &SCHEMA,
            None,
            "eggOp",
        )
        .unwrap_err();
        insta::assert_snapshot!(
            error,
            @"Value at eggOp does not match declared type CookEggInput: no such field salt on CookEggInput"
        );
    }

    #[test]
    fn nested_error_paths_are_dotted_and_indexed() {
        let value = json!({"eggs": [{"minutes": 4}, {"minutes": "nine"}]});
        let error = coerce(&value, &shape("batch"), &SCHEMA, None, "batch").unwrap_err();
        insta::assert_snapshot!(
            error,
            @"Value at batch.eggs[1].minutes does not match declared type Int!: expected an integer"
        );
    }

    #[test]
    fn unregistered_custom_scalar_is_unsupported() {
        let error = coerce(
            &json!("2024-05-01T00:00:00Z"),
            &shape("at"),
            &SCHEMA,
            None,
            "at",
        )
        .unwrap_err();
        insta::assert_snapshot!(error, @"No serialization strategy for type Timestamp at at");
    }

    #[test]
    fn registered_custom_scalar_validates_shape() {
        let scalars = CustomScalarMap::from_str(r#"{"Timestamp": "string"}"#).unwrap();

        let coerced = coerce(
            &json!("2024-05-01T00:00:00Z"),
            &shape("at"),
            &SCHEMA,
            Some(&scalars),
            "at",
        )
        .unwrap();
        assert_eq!(coerced, json!("2024-05-01T00:00:00Z"));

        let error = coerce(&json!(12), &shape("at"), &SCHEMA, Some(&scalars), "at").unwrap_err();
        insta::assert_snapshot!(
            error,
            @"Value at at does not match declared type Timestamp: expected String shape"
        );
    }

    #[rstest]
    #[case("int", "Int")]
    #[case("intRequired", "Int!")]
    #[case("ids", "[ID!]")]
    #[case("nested", "[[EggStyle]!]!")]
    fn renders_type_text(#[case] field: &str, #[case] expected: &str) {
        assert_eq!(type_text(&shape(field)), expected);
    }
}
