use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Error body returned by the catalog API on rejected requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: BTreeMap::new(),
        }
    }

    /// Parses a response body, falling back to the raw text as the message.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ApiError>(body) {
            Ok(parsed) if !parsed.message.is_empty() || !parsed.errors.is_empty() => parsed,
            _ => Self::new(body.trim()),
        }
    }
}
