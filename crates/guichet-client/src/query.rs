//! Query-string encoding for enrollment list filters.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};

/// Characters escaped in serialized structured values — the set
/// `encodeURIComponent` escapes, so both ends of the wire agree.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'!')
  .remove(b'~')
  .remove(b'*')
  .remove(b'\'')
  .remove(b'(')
  .remove(b')');

/// Build a `?key=value&…` query string from a JSON object.
///
/// Keys with nothing to say are dropped: empty objects and arrays, `false`,
/// `0`, `null` and the empty string. Structured values are serialized to
/// JSON and percent-encoded; scalars are rendered as-is. Returns the empty
/// string when nothing remains.
pub fn to_query_string(params: &Map<String, Value>) -> String {
  let pairs: Vec<String> = params
    .iter()
    .filter(|(_, value)| !is_empty_param(value))
    .map(|(key, value)| format!("{key}={}", encode_param(value)))
    .collect();

  if pairs.is_empty() {
    String::new()
  } else {
    format!("?{}", pairs.join("&"))
  }
}

fn is_empty_param(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(flag) => !flag,
    Value::Number(number) => number.as_f64() == Some(0.0),
    Value::String(text) => text.is_empty(),
    Value::Array(items) => items.is_empty(),
    Value::Object(map) => map.is_empty(),
  }
}

fn encode_param(value: &Value) -> String {
  match value {
    Value::Array(_) | Value::Object(_) => {
      utf8_percent_encode(&value.to_string(), COMPONENT).to_string()
    }
    Value::String(text) => text.clone(),
    scalar => scalar.to_string(),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
