use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One slot of an array-structured cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    Str(String),
    Int(i64),
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        KeyPart::Str(value.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        KeyPart::Str(value)
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        KeyPart::Int(value)
    }
}

/// Ordered array of strings and integers; the shared key shape of every
/// navigator cache, hot and cold.
pub type CacheKey = Vec<KeyPart>;

/// Canonical JSON-array rendering of a key, used as the hot tier's internal
/// string key.
pub fn canonical_key(key: &CacheKey) -> Result<String> {
    Ok(serde_json::to_string(key)?)
}
