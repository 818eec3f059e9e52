//! JSON schema builders for MCP tools.

use serde_json::{Map, Value};

use crate::tools::{ToolProperty, ToolSpec};

/// Build the input schema advertised for `spec`.
pub(crate) fn tool_input_schema(spec: &ToolSpec) -> Map<String, Value> {
    let mut properties = Map::new();
    for property in spec.properties {
        properties.insert(property.name.into(), property_schema(property));
    }

    let required: Vec<&str> = spec
        .required_properties()
        .map(|property| property.name)
        .collect();
    finalize_object_schema(properties, &required)
}

fn property_schema(property: &ToolProperty) -> Value {
    let mut schema = Map::new();
    schema.insert(
        "type".into(),
        Value::String(property.property_type.into()),
    );
    schema.insert(
        "description".into(),
        Value::String(property.description.into()),
    );
    Value::Object(schema)
}

fn finalize_object_schema(properties: Map<String, Value>, required: &[&str]) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert(
            "required".into(),
            Value::Array(
                required
                    .iter()
                    .map(|&key| Value::String(key.into()))
                    .collect(),
            ),
        );
    }
    schema
}
