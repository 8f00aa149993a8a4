//! Turns API error bodies into the single message shown next to a form.

use serde_json::{Map, Value};

use super::base::Endpoint;

const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Picks the first non-empty candidate, in order:
///
/// 1. `non_field_errors[0]`
/// 2. the first message of any other field error list (e.g. `{"email": [..]}`)
/// 3. `detail`
/// 4. `message`
/// 5. the raw body text
/// 6. the endpoint's fallback message
pub fn normalize_error(endpoint: Endpoint, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(message) = from_object(&map) {
            return message;
        }
    }

    let raw = body.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }

    endpoint.fallback_message().to_string()
}

fn from_object(map: &Map<String, Value>) -> Option<String> {
    if let Some(message) = map.get(NON_FIELD_ERRORS).and_then(first_text) {
        return Some(message);
    }

    let field_error = map
        .iter()
        .filter(|(key, value)| key.as_str() != NON_FIELD_ERRORS && value.is_array())
        .find_map(|(_, value)| first_text(value));
    if field_error.is_some() {
        return field_error;
    }

    ["detail", "message"]
        .iter()
        .find_map(|key| map.get(*key).and_then(first_text))
}

/// A non-empty string, or the first non-empty string of an array.
fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
