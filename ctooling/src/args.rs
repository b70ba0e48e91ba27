//! Argument helpers for tool handlers.
//!
//! ```rust
//! use ctooling::{parse_json_value, required_string};
//!
//! let args = parse_json_value(r#"{"to":"+15550001"}"#).expect("object should parse");
//! assert_eq!(required_string(&args, "to").expect("to should be present"), "+15550001");
//! ```

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ToolError;

/// Parses model-produced argument text. Blank text means "no arguments".
pub fn parse_json_value(args_json: &str) -> Result<Value, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(args_json)
        .map_err(|err| ToolError::input_invalid(format!("invalid JSON arguments: {err}")))
}

pub fn required_string(args: &Value, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::input_invalid(format!("missing required string: '{key}'")))
}

pub fn optional_string(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// Deserializes validated input into a handler's argument struct.
pub fn from_input<T>(input: Value) -> Result<T, ToolError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(input)
        .map_err(|err| ToolError::input_invalid(format!("arguments do not fit handler: {err}")))
}

/// Serializes a handler's output struct.
pub fn to_output<T>(output: &T) -> Result<Value, ToolError>
where
    T: serde::Serialize,
{
    serde_json::to_value(output)
        .map_err(|err| ToolError::execution(format!("output could not be serialized: {err}")))
}
