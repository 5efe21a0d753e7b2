// ABOUTME: Request decoding helpers for path ids, JSON bodies and confirm flags
// ABOUTME: Malformed input is reported as InvalidInput rather than an extractor rejection

use axum::body::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;

use planboard_core::parse_id_str;

use crate::response::ApiError;

/// Parse a path or query id segment.
pub fn path_id(raw: &str) -> Result<i64, ApiError> {
    Ok(parse_id_str(raw)?)
}

/// Decode a JSON body. An empty body decodes as the type's default.
pub fn json_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::invalid(format!("Invalid JSON body: {}", e)))
}

/// Confirm flags accept `true` or the string `"true"`; anything else means no.
pub fn is_confirmed(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}
