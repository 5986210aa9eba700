//! Reading CI status records
//!
//! Input is the JSON emitted by `debci status --all --json`: an array of
//! flat objects, one per package.
//!
//! Field values become strings: JSON strings are kept as-is, numbers and
//! booleans use their JSON text, `null` becomes the empty string and nested
//! arrays or objects are kept as compact JSON.

use std::collections::HashMap;
use std::io::Read;

use serde_json::Value as Json;
use thiserror::Error;

use crate::core::models::Record;

/// Errors that can occur when reading records
#[derive(Debug, Error)]
pub enum InputError {
    /// Input could not be read
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Input is not valid JSON
    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level value is not an array
    #[error("input must be a JSON array of objects, got {0}")]
    NotAnArray(&'static str),

    /// An array element is not an object
    #[error("record {index} is not a JSON object, got {kind}")]
    NotAnObject {
        /// Position in the input array
        index: usize,
        /// JSON type that was found
        kind: &'static str,
    },

    /// A record has no package field
    #[error("record {index} has no 'package' field")]
    MissingPackage {
        /// Position in the input array
        index: usize,
    },
}

/// Read records from a reader
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<Record>, InputError> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_records(&content)
}

/// Parse records from a JSON string
pub fn parse_records(content: &str) -> Result<Vec<Record>, InputError> {
    let json: Json = serde_json::from_str(content)?;
    let items = match json {
        Json::Array(items) => items,
        other => return Err(InputError::NotAnArray(json_kind(&other))),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let object = match item {
                Json::Object(object) => object,
                other => {
                    return Err(InputError::NotAnObject {
                        index,
                        kind: json_kind(&other),
                    });
                },
            };
            let fields: HashMap<String, String> =
                object.into_iter().map(|(name, value)| (name, field_text(value))).collect();
            Record::from_fields(fields).ok_or(InputError::MissingPackage { index })
        })
        .collect()
}

fn field_text(value: Json) -> String {
    match value {
        Json::String(s) => s,
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

const fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
