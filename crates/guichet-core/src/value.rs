//! Tagged field-value type for enrollment records.
//!
//! Record fields are scalars, ordered sequences, or objects. Diffing and
//! flattening dispatch on the explicit variant tag instead of re-inspecting
//! raw JSON shapes at every call site.

use serde_json::{Number, Value};

// ─── Scalar ──────────────────────────────────────────────────────────────────

/// A terminal (non-structured) field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
  Null,
  Bool(bool),
  Number(Number),
  String(String),
}

// ─── FieldValue ──────────────────────────────────────────────────────────────

/// A field value as it appears in an enrollment record: a scalar leaf or a
/// nested structure.
///
/// Objects keep their entries as ordered pairs, so every traversal sees keys
/// in encounter order.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
  Scalar(Scalar),
  Sequence(Vec<FieldValue>),
  Object(Vec<(String, FieldValue)>),
}

impl FieldValue {
  pub fn is_structured(&self) -> bool {
    matches!(self, Self::Sequence(_) | Self::Object(_))
  }

  /// Flatten into `(path, leaf)` pairs, one per terminal value, with path
  /// segments joined by `.` and sequence indices as numeric segments.
  ///
  /// Flattening a scalar yields the single pair `(prefix, self)`; empty
  /// structures yield nothing.
  pub fn flatten(&self, prefix: &str) -> Vec<(String, FieldValue)> {
    let mut leaves = Vec::new();
    self.flatten_into(prefix, &mut leaves);
    leaves
  }

  fn flatten_into(&self, prefix: &str, leaves: &mut Vec<(String, FieldValue)>) {
    match self {
      Self::Scalar(_) => leaves.push((prefix.to_string(), self.clone())),
      Self::Sequence(items) => {
        for (index, item) in items.iter().enumerate() {
          item.flatten_into(&format!("{prefix}.{index}"), leaves);
        }
      }
      Self::Object(entries) => {
        for (key, value) in entries {
          value.flatten_into(&format!("{prefix}.{key}"), leaves);
        }
      }
    }
  }

  /// Back to plain JSON, for rendering structured values.
  pub fn to_json(&self) -> Value {
    match self {
      Self::Scalar(Scalar::Null) => Value::Null,
      Self::Scalar(Scalar::Bool(flag)) => Value::Bool(*flag),
      Self::Scalar(Scalar::Number(number)) => Value::Number(number.clone()),
      Self::Scalar(Scalar::String(text)) => Value::String(text.clone()),
      Self::Sequence(items) => {
        Value::Array(items.iter().map(FieldValue::to_json).collect())
      }
      Self::Object(entries) => Value::Object(
        entries
          .iter()
          .map(|(key, value)| (key.clone(), value.to_json()))
          .collect(),
      ),
    }
  }
}

impl From<&Value> for FieldValue {
  fn from(value: &Value) -> Self {
    match value {
      Value::Null => Self::Scalar(Scalar::Null),
      Value::Bool(flag) => Self::Scalar(Scalar::Bool(*flag)),
      Value::Number(number) => Self::Scalar(Scalar::Number(number.clone())),
      Value::String(text) => Self::Scalar(Scalar::String(text.clone())),
      Value::Array(items) => {
        Self::Sequence(items.iter().map(Self::from).collect())
      }
      Value::Object(map) => Self::Object(
        map
          .iter()
          .map(|(key, value)| (key.clone(), Self::from(value)))
          .collect(),
      ),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn scalar_flattens_to_its_prefix() {
    let value = FieldValue::from(&json!("hello"));
    let leaves = value.flatten("intitule");
    assert_eq!(leaves.len(), 1);
    assert_eq!(leaves[0].0, "intitule");
  }

  #[test]
  fn sequence_of_objects_flattens_with_indices() {
    let value = FieldValue::from(&json!([
      { "nom": "a", "email": "b" },
      { "nom": "c" },
    ]));
    let paths: Vec<String> =
      value.flatten("contacts").into_iter().map(|(p, _)| p).collect();
    assert_eq!(
      paths,
      vec!["contacts.0.nom", "contacts.0.email", "contacts.1.nom"]
    );
  }

  #[test]
  fn empty_structures_produce_no_leaves() {
    assert!(FieldValue::from(&json!([])).flatten("k").is_empty());
    assert!(FieldValue::from(&json!({})).flatten("k").is_empty());
  }

  #[test]
  fn deep_nesting_joins_all_segments() {
    let value = FieldValue::from(&json!({ "a": [{ "b": 1 }] }));
    let leaves = value.flatten("root");
    assert_eq!(leaves[0].0, "root.a.0.b");
  }

  #[test]
  fn json_round_trip_preserves_structure() {
    let raw = json!({ "x": [1, "two", true, null] });
    assert_eq!(FieldValue::from(&raw).to_json(), raw);
  }
}
