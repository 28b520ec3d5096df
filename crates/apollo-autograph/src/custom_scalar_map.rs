use crate::errors::SchemaError;
use serde_json::Value;
use std::{collections::HashMap, path::PathBuf, str::FromStr};

impl FromStr for CustomScalarMap {
    type Err = SchemaError;

    fn from_str(string_custom_scalar_config: &str) -> Result<Self, Self::Err> {
        // Parse the string into an initial map of serde_json::Values
        let parsed_custom_scalar_config: serde_json::Map<String, Value> =
            serde_json::from_str(string_custom_scalar_config)
                .map_err(SchemaError::CustomScalarConfig)?;

        // Validate each of the values in the map and coerce into ScalarShape
        let custom_scalar_map = parsed_custom_scalar_config
            .into_iter()
            .map(|(key, value)| {
                let shape = serde_json::from_value::<ScalarShape>(value.clone())
                    .map_err(|_| SchemaError::CustomScalarShape(value))?;
                Ok((key, shape))
            })
            .collect::<Result<_, SchemaError>>()?;

        Ok(CustomScalarMap(custom_scalar_map))
    }
}

impl TryFrom<&PathBuf> for CustomScalarMap {
    type Error = SchemaError;

    fn try_from(file_path_buf: &PathBuf) -> Result<Self, Self::Error> {
        let custom_scalars_config_path = file_path_buf.as_path();
        tracing::debug!(custom_scalars_config=?custom_scalars_config_path, "Loading custom_scalars_config");
        let string_custom_scalar_config = std::fs::read_to_string(custom_scalars_config_path)?;
        CustomScalarMap::from_str(string_custom_scalar_config.as_str())
    }
}

/// Maps custom scalar names to the JSON shape accepted for their values
#[derive(Debug, Clone, Default)]
pub struct CustomScalarMap(HashMap<String, ScalarShape>);

impl CustomScalarMap {
    pub fn get(&self, key: &str) -> Option<ScalarShape> {
        self.0.get(key).copied()
    }
}

/// The JSON shape a custom scalar value must take on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarShape {
    String,
    Number,
    Boolean,
    Object,
    Array,
    /// Accept any JSON value without further checks
    Any,
}

impl ScalarShape {
    pub(crate) fn matches(self, value: &Value) -> bool {
        match self {
            ScalarShape::String => value.is_string(),
            ScalarShape::Number => value.is_number(),
            ScalarShape::Boolean => value.is_boolean(),
            ScalarShape::Object => value.is_object(),
            ScalarShape::Array => value.is_array(),
            ScalarShape::Any => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, str::FromStr};

    use crate::custom_scalar_map::{CustomScalarMap, ScalarShape};

    #[test]
    fn empty_config() {
        let result = CustomScalarMap::from_str("").err().unwrap();

        insta::assert_debug_snapshot!(result, @r###"
            CustomScalarConfig(
                Error("EOF while parsing a value", line: 1, column: 0),
            )
        "###)
    }

    #[test]
    fn invalid_json() {
        let result = CustomScalarMap::from_str("Hello: }").err().unwrap();

        insta::assert_debug_snapshot!(result, @r###"
            CustomScalarConfig(
                Error("expected value", line: 1, column: 1),
            )
        "###)
    }

    #[test]
    fn invalid_shape() {
        let result = CustomScalarMap::from_str(
            r###"{
                "Timestamp": "datetime"
            }"###,
        )
        .err()
        .unwrap();

        insta::assert_debug_snapshot!(result, @r###"
        CustomScalarShape(
            String("datetime"),
        )
        "###)
    }

    #[test]
    fn valid_config() {
        let result = CustomScalarMap::from_str(
            r###"
        {
            "Timestamp": "string",
            "BigInt": "number",
            "JSON": "any"
        }
        "###,
        )
        .unwrap()
        .0;

        let expected_data = HashMap::from_iter([
            ("Timestamp".to_string(), ScalarShape::String),
            ("BigInt".to_string(), ScalarShape::Number),
            ("JSON".to_string(), ScalarShape::Any),
        ]);
        assert_eq!(result, expected_data);
    }

    #[test]
    fn shape_matching() {
        assert!(ScalarShape::String.matches(&serde_json::json!("now")));
        assert!(!ScalarShape::String.matches(&serde_json::json!(12)));
        assert!(ScalarShape::Number.matches(&serde_json::json!(12.5)));
        assert!(ScalarShape::Object.matches(&serde_json::json!({"a": 1})));
        assert!(!ScalarShape::Array.matches(&serde_json::json!({"a": 1})));
        assert!(ScalarShape::Any.matches(&serde_json::json!(null)));
    }
}
