//! Custom serde helpers for query parameters.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserializes an optional UUID query parameter leniently: absent, empty,
/// or unparseable values become `None` instead of rejecting the request.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Uuid::parse_str(trimmed).ok()
        }
    }))
}
