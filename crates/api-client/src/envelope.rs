//! List response normalization
//!
//! List endpoints may answer with a bare array, `{"items": [...]}` or an
//! object keyed by the resource name (`{"properties": [...]}`). Everything
//! past the client sees a flat `Vec<T>` in the order the backend sent it.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Key of the documented list envelope
pub const ITEMS_KEY: &str = "items";

pub fn normalize_list<T: DeserializeOwned>(payload: Value, resource: &str) -> Result<Vec<T>> {
    let array = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(ITEMS_KEY).or_else(|| map.remove(resource)) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ClientError::UnexpectedShape {
                    resource: resource.to_string(),
                    found: format!("list key holding {}", kind_of(&other)),
                })
            }
            None => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                return Err(ClientError::UnexpectedShape {
                    resource: resource.to_string(),
                    found: format!("object with keys [{}]", keys.join(", ")),
                });
            }
        },
        other => {
            return Err(ClientError::UnexpectedShape {
                resource: resource.to_string(),
                found: kind_of(&other).to_string(),
            })
        }
    };

    array
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(ClientError::from))
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
