//! DynamoDB attribute-value flattening.
//!
//! Stream images wrap every value in a single-key type descriptor:
//!
//! ```text
//! {"id": {"N": "7"}, "tags": {"SS": ["a", "b"]}, "meta": {"M": {"ok": {"BOOL": true}}}}
//!     → {"id": 7, "tags": ["a", "b"], "meta": {"ok": true}}
//! ```
//!
//! Numbers arrive as strings and become integers when they parse as one,
//! floats otherwise. Binary values stay base64 strings.

use serde_json::{Map, Number, Value};

use crate::routing::types::InputError;

/// Flatten every attribute of an image.
pub fn flatten_image(image: &Map<String, Value>) -> Result<Map<String, Value>, InputError> {
    image
        .iter()
        .map(|(name, attribute)| flatten_attribute(name, attribute).map(|flat| (name.clone(), flat)))
        .collect()
}

/// Flatten a single typed attribute value.
pub fn flatten_attribute(name: &str, attribute: &Value) -> Result<Value, InputError> {
    let descriptor = attribute
        .as_object()
        .filter(|d| d.len() == 1)
        .ok_or_else(|| invalid(name, "expected a single type descriptor"))?;
    let Some((kind, value)) = descriptor.iter().next() else {
        return Err(invalid(name, "expected a single type descriptor"));
    };

    match kind.as_str() {
        "S" | "B" => as_string(name, value).map(|s| Value::String(s.to_string())),
        "N" => parse_number(name, as_string(name, value)?),
        "BOOL" => value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| invalid(name, "BOOL must be a boolean")),
        "NULL" => Ok(Value::Null),
        "M" => {
            let nested = value
                .as_object()
                .ok_or_else(|| invalid(name, "M must be an object"))?;
            flatten_image(nested).map(Value::Object)
        }
        "L" => as_array(name, value)?
            .iter()
            .map(|item| flatten_attribute(name, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        "SS" | "BS" => as_array(name, value)?
            .iter()
            .map(|item| as_string(name, item).map(|s| Value::String(s.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        "NS" => as_array(name, value)?
            .iter()
            .map(|item| as_string(name, item).and_then(|raw| parse_number(name, raw)))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Err(invalid(name, &format!("unknown type descriptor `{other}`"))),
    }
}

fn parse_number(name: &str, raw: &str) -> Result<Value, InputError> {
    if let Ok(int) = raw.parse::<i64>() {
        return Ok(Value::Number(int.into()));
    }
    if let Ok(uint) = raw.parse::<u64>() {
        return Ok(Value::Number(uint.into()));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| invalid(name, &format!("`{raw}` is not a number")))
}

fn as_string<'v>(name: &str, value: &'v Value) -> Result<&'v str, InputError> {
    value
        .as_str()
        .ok_or_else(|| invalid(name, "expected a string"))
}

fn as_array<'v>(name: &str, value: &'v Value) -> Result<&'v Vec<Value>, InputError> {
    value
        .as_array()
        .ok_or_else(|| invalid(name, "expected a list"))
}

fn invalid(name: &str, reason: &str) -> InputError {
    InputError::InvalidAttribute {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
