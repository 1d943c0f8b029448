//! Request body acquisition
//!
//! The body is read up to [`MAX_BODY_BYTES`] and decoded according to the
//! declared content type:
//!
//! | Content-Type                         | Parse                 | On failure   |
//! |--------------------------------------|-----------------------|--------------|
//! | contains `application/json`          | JSON (empty -> `{}`)  | `BodyError`  |
//! | contains `x-www-form-urlencoded`     | form fields           | `BodyError`  |
//! | anything else or absent              | JSON, best effort     | empty record |

use axum::{
    body::Body,
    http::{HeaderMap, header},
};
use missive_common::submission::Record;
use serde_json::Value;
use thiserror::Error;

/// 1 MiB
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum BodyError {
    /// The body was larger than the limit or the stream failed
    #[error("Failed to read body (limit {MAX_BODY_BYTES} bytes): {0}")]
    Read(#[source] axum::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

/// How a body is to be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    Undeclared,
}

impl BodyKind {
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::from_content_type(
            headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        )
    }

    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

        if content_type.contains("application/json") {
            Self::Json
        } else if content_type.contains("application/x-www-form-urlencoded") {
            Self::Form
        } else {
            Self::Undeclared
        }
    }
}

/// Read and decode a request body.
///
/// # Errors
///
/// Returns [`BodyError`] if the body exceeds [`MAX_BODY_BYTES`], cannot be
/// read, or does not parse as its declared type.
pub async fn read_record(kind: BodyKind, body: Body) -> Result<Record, BodyError> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(BodyError::Read)?;

    parse_record(kind, &String::from_utf8_lossy(&bytes))
}

/// Decode body text. A JSON document that is not an object yields an
/// empty record.
///
/// # Errors
///
/// Returns [`BodyError`] if declared JSON or a form body does not parse.
pub fn parse_record(kind: BodyKind, text: &str) -> Result<Record, BodyError> {
    match kind {
        BodyKind::Json => Ok(into_record(parse_json(text)?)),
        BodyKind::Form => parse_form(text),
        BodyKind::Undeclared => Ok(parse_json(text).map(into_record).unwrap_or_default()),
    }
}

fn parse_json(text: &str) -> Result<Value, serde_json::Error> {
    if text.is_empty() {
        return Ok(Value::Object(Record::new()));
    }
    serde_json::from_str(text)
}

fn into_record(value: Value) -> Record {
    match value {
        Value::Object(record) => record,
        _ => Record::new(),
    }
}

/// Repeated keys are joined with `,` in order of appearance.
fn parse_form(text: &str) -> Result<Record, BodyError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(text)?;
    let mut record = Record::new();

    for (key, value) in pairs {
        match record.get_mut(&key) {
            Some(Value::String(existing)) => {
                existing.push(',');
                existing.push_str(&value);
            }
            _ => {
                record.insert(key, Value::String(value));
            }
        }
    }

    Ok(record)
}
