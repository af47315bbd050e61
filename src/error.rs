use serde_json::Value;
use thiserror::Error;

/// A response body did not have the shape we read from it.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing key `{path}` in response")]
    MissingKey { path: String },
    #[error("expected an array at `{path}`")]
    NotAnArray { path: String },
    #[error("expected a string at `{path}`")]
    NotAString { path: String },
    #[error("expected an object at `{path}`")]
    NotAnObject { path: String },
}

/// Walk `keys` into nested JSON objects, failing on the first absent key.
pub(crate) fn lookup<'a>(value: &'a Value, keys: &[&str]) -> Result<&'a Value, SchemaError> {
    let mut current = value;
    for (depth, key) in keys.iter().enumerate() {
        current = current.get(*key).ok_or_else(|| SchemaError::MissingKey {
            path: keys[..=depth].join("."),
        })?;
    }
    Ok(current)
}

pub(crate) fn lookup_array<'a>(
    value: &'a Value,
    keys: &[&str],
) -> Result<&'a Vec<Value>, SchemaError> {
    lookup(value, keys)?
        .as_array()
        .ok_or_else(|| SchemaError::NotAnArray {
            path: keys.join("."),
        })
}

/// Move the array stored under `key` out of `value`, leaving `null` behind.
pub(crate) fn take_array(value: &mut Value, key: &str) -> Result<Vec<Value>, SchemaError> {
    match value.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(SchemaError::NotAnArray {
            path: key.to_string(),
        }),
        None => Err(SchemaError::MissingKey {
            path: key.to_string(),
        }),
    }
}

pub(crate) fn lookup_str<'a>(value: &'a Value, keys: &[&str]) -> Result<&'a str, SchemaError> {
    lookup(value, keys)?
        .as_str()
        .ok_or_else(|| SchemaError::NotAString {
            path: keys.join("."),
        })
}
