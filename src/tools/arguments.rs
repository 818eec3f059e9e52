//! Trigger payload decoding and required-field validation shared by every tool.

use serde_json::{Map, Value};
use thiserror::Error;

use super::spec::ToolSpec;

/// Field holding the tool arguments inside a trigger payload.
pub const ARGUMENTS_FIELD: &str = "arguments";

/// Input delivered to a tool at invocation time.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerPayload {
    /// Raw text expected to contain a JSON document.
    Text(String),
    /// Payload already decoded into a JSON object.
    Object(Map<String, Value>),
    /// Any other JSON shape; always rejected by [`extract`].
    Other(Value),
}

impl TriggerPayload {
    /// Wrap MCP call arguments the way the hosted trigger does: `{"arguments": {...}}`.
    pub fn from_tool_call(arguments: Option<Map<String, Value>>) -> Self {
        let mut payload = Map::new();
        payload.insert(
            ARGUMENTS_FIELD.to_string(),
            Value::Object(arguments.unwrap_or_default()),
        );
        Self::Object(payload)
    }
}

impl From<Value> for TriggerPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Object(map) => Self::Object(map),
            other => Self::Other(other),
        }
    }
}

impl From<String> for TriggerPayload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for TriggerPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Reasons a trigger payload cannot be turned into validated arguments.
///
/// The `Display` output of each variant is the literal message returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// Text payload that is not JSON, or a payload that is neither text nor an object.
    #[error("Invalid request payload")]
    InvalidPayload,
    /// Decoded payload without an object-valued `arguments` field.
    #[error("Invalid arguments")]
    InvalidArguments,
    /// Required field absent or empty.
    #[error("No {label} provided")]
    MissingField {
        /// Field name as it appears in the arguments.
        field: &'static str,
        /// Human description used in the message.
        label: &'static str,
    },
}

/// Flat argument mapping extracted from a trigger payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Return a field when it holds a non-empty string.
    ///
    /// Empty strings, `null` and non-string values count as not provided.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Check each required field of `spec` in declared order, stopping at the first gap.
    pub fn require(&self, spec: &ToolSpec) -> Result<(), ArgumentError> {
        for property in spec.required_properties() {
            if self.get_str(property.name).is_none() {
                return Err(ArgumentError::MissingField {
                    field: property.name,
                    label: property.label,
                });
            }
        }
        Ok(())
    }

    /// Fetch a field previously checked by [`ToolArguments::require`].
    pub(crate) fn required(&self, field: &'static str) -> &str {
        self.get_str(field).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for ToolArguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Normalize a trigger payload into its `arguments` mapping.
pub fn extract(payload: &TriggerPayload) -> Result<ToolArguments, ArgumentError> {
    match payload {
        TriggerPayload::Text(text) => {
            let root: Value = serde_json::from_str(text).map_err(|err| {
                tracing::debug!(error = %err, "Failed to decode trigger payload as JSON");
                ArgumentError::InvalidPayload
            })?;
            match root {
                Value::Object(map) => arguments_of(&map),
                _ => Err(ArgumentError::InvalidArguments),
            }
        }
        TriggerPayload::Object(map) => arguments_of(map),
        TriggerPayload::Other(_) => Err(ArgumentError::InvalidPayload),
    }
}

/// Extract the payload and validate the fields `spec` requires.
pub fn extract_for(
    payload: &TriggerPayload,
    spec: &ToolSpec,
) -> Result<ToolArguments, ArgumentError> {
    let arguments = extract(payload)?;
    arguments.require(spec)?;
    Ok(arguments)
}

fn arguments_of(map: &Map<String, Value>) -> Result<ToolArguments, ArgumentError> {
    match map.get(ARGUMENTS_FIELD) {
        Some(Value::Object(arguments)) => Ok(ToolArguments(arguments.clone())),
        _ => Err(ArgumentError::InvalidArguments),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::spec::{ABUSEIPDB_REPORT_IP, SAVE_SNIPPET};
    use serde_json::json;

    #[test]
    fn text_payload_is_decoded() {
        let payload = TriggerPayload::from(r#"{"arguments": {"ip": "1.2.3.4"}}"#);
        let args = extract(&payload).expect("arguments");
        assert_eq!(args.get_str("ip"), Some("1.2.3.4"));
    }

    #[test]
    fn object_payload_is_used_directly() {
        let payload = TriggerPayload::from(json!({ "arguments": { "snippetname": "a" } }));
        let args = extract(&payload).expect("arguments");
        assert_eq!(args.get_str("snippetname"), Some("a"));
    }

    #[test]
    fn malformed_text_is_invalid_payload() {
        let payload = TriggerPayload::from("not json");
        assert_eq!(extract(&payload), Err(ArgumentError::InvalidPayload));
    }

    #[test]
    fn non_object_payload_is_invalid_payload() {
        let payload = TriggerPayload::from(json!(12345));
        assert_eq!(extract(&payload), Err(ArgumentError::InvalidPayload));
    }

    #[test]
    fn arguments_must_be_a_mapping() {
        for payload in [
            TriggerPayload::from(json!({ "arguments": "not a dict" })),
            TriggerPayload::from(json!({ "other": {} })),
            TriggerPayload::from(r#"{"arguments": [1, 2]}"#),
            TriggerPayload::from("42"),
        ] {
            assert_eq!(extract(&payload), Err(ArgumentError::InvalidArguments));
        }
    }

    #[test]
    fn empty_and_non_string_values_are_not_provided() {
        let args = ToolArguments::from(
            json!({ "a": "", "b": null, "c": 5, "d": "x" })
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(args.get_str("a"), None);
        assert_eq!(args.get_str("b"), None);
        assert_eq!(args.get_str("c"), None);
        assert_eq!(args.get_str("d"), Some("x"));
        assert_eq!(args.get_str("missing"), None);
    }

    #[test]
    fn first_missing_field_short_circuits() {
        let payload = TriggerPayload::from(json!({ "arguments": {} }));
        let err = extract_for(&payload, &ABUSEIPDB_REPORT_IP).unwrap_err();
        assert_eq!(err.to_string(), "No ip provided");

        let payload = TriggerPayload::from(json!({ "arguments": { "snippet": "content" } }));
        let err = extract_for(&payload, &SAVE_SNIPPET).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::MissingField {
                field: "snippetname",
                label: "snippet name"
            }
        );
    }

    #[test]
    fn tool_call_arguments_are_wrapped() {
        let payload = TriggerPayload::from_tool_call(None);
        assert_eq!(
            payload,
            TriggerPayload::Object(json!({ "arguments": {} }).as_object().cloned().unwrap())
        );
    }
}
