//! Web API request decoding.
//!
//! Platform SDKs send either `application/x-www-form-urlencoded` bodies, where
//! structured arguments such as `blocks` or `view` are JSON embedded in a
//! string, or `application/json` bodies with those arguments inline. Both
//! decode to the same parameter map.

use axum::http::{HeaderMap, header};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::response::ApiError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams(Map<String, Value>);

impl RequestParams {
    pub fn decode(headers: &HeaderMap, body: &[u8]) -> Result<Self, ApiError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            Self::from_json(body)
        } else {
            Self::from_form(body)
        }
    }

    pub fn from_json(body: &[u8]) -> Result<Self, ApiError> {
        if body.is_empty() {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ApiError::invalid(format!(
                "expected a JSON object body, got {other}"
            ))),
        }
    }

    pub fn from_form(body: &[u8]) -> Result<Self, ApiError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ApiError::invalid(format!("form body: {e}")))?;
        Ok(Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
        ))
    }

    /// A scalar argument as text; numbers and booleans are stringified.
    pub fn string(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// A scalar argument that must be present and non-empty.
    pub fn required(&self, name: &str) -> Result<String, ApiError> {
        self.string(name)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::invalid(format!("missing argument {name}")))
    }

    /// A structured argument, inline or embedded as a JSON string.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        let decoded = match self.0.get(name) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => serde_json::from_str(s),
            Some(inline) => T::deserialize(inline),
        };
        decoded
            .map(Some)
            .map_err(|e| ApiError::invalid(format!("argument {name}: {e}")))
    }
}
