//! Human-readable changelog for enrollment record diffs.
//!
//! A diff is a JSON object mapping each changed top-level field to a
//! `[before, after]` pair. [`summarize`] flattens nested pairs down to leaf
//! paths (`contacts.0.nom`), drops unchanged leaves, and renders one French
//! sentence per surviving change. [`record_diff`] produces such a diff from
//! two record snapshots.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::{
  error::{Error, Result},
  value::{FieldValue, Scalar},
};

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Metadata fields stripped from every diff before flattening.
const EXCLUDED_FIELDS: &[&str] = &["updated_at"];

/// French label fragments for known leaf paths. Paths not listed here fall
/// back to `du champ <path>`.
const FIELD_LABELS: &[(&str, &str)] = &[
  ("cgu_approved", "de l'approbation des CGU"),
  ("data_recipients", "des destinataires des données"),
  ("data_retention_period", "de la durée de conservation des données"),
  (
    "data_retention_comment",
    "de la justification de la durée de conservation des données",
  ),
  ("description", "de la description"),
  ("fondement_juridique_title", "de la référence du cadre juridique"),
  ("fondement_juridique_url", "de l'url du cadre juridique"),
  ("intitule", "de l'intitulé"),
  ("contacts.0.nom", "du nom du DPD"),
  ("contacts.0.email", "de l'email du DPD"),
  ("contacts.0.phone_number", "du numéro de téléphone du DPD"),
  ("contacts.1.nom", "du nom du responsable de traitement"),
  ("contacts.1.email", "de l'email du responsable de traitement"),
  (
    "contacts.1.phone_number",
    "du numéro de téléphone du responsable de traitement",
  ),
  ("contacts.2.nom", "du nom du responsable technique"),
  ("contacts.2.email", "de l'email du responsable technique"),
  (
    "contacts.2.phone_number",
    "du numéro de téléphone du responsable technique",
  ),
];

fn label_for(path: &str) -> Option<&'static str> {
  FIELD_LABELS
    .iter()
    .find(|(key, _)| *key == path)
    .map(|(_, label)| *label)
}

// ─── Leaf changes ────────────────────────────────────────────────────────────

/// One leaf-level change: a flattened path and its before/after values.
/// A `None` side means the leaf exists only on the other side (an array
/// element was added or removed).
#[derive(Debug)]
struct LeafChange {
  path:   String,
  before: Option<FieldValue>,
  after:  Option<FieldValue>,
}

// ─── Summarize ───────────────────────────────────────────────────────────────

/// Render a human-readable change entry for every leaf that differs between
/// the two sides of `diff`.
///
/// Never fails: malformed input is logged through `tracing` and yields an
/// empty list, so a rendering caller can always proceed.
pub fn summarize(diff: &Value) -> Vec<String> {
  match try_summarize(diff) {
    Ok(entries) => entries,
    Err(error) => {
      tracing::error!(%error, "failed to compute enrollment changelog");
      Vec::new()
    }
  }
}

/// The fallible pipeline behind [`summarize`]: flatten, merge, drop
/// unchanged, format.
fn try_summarize(diff: &Value) -> Result<Vec<String>> {
  let entries = diff.as_object().ok_or(Error::DiffNotObject)?;
  let mut changes: Vec<LeafChange> = Vec::new();

  for (field, pair) in entries {
    if EXCLUDED_FIELDS.contains(&field.as_str()) {
      continue;
    }
    let (before, after) = split_pair(field, pair)?;
    if before.is_structured() {
      changes.extend(merge_flattened(field, &before, &after));
    } else if before != after {
      changes.push(LeafChange {
        path:   field.clone(),
        before: Some(before),
        after:  Some(after),
      });
    }
  }

  Ok(changes.iter().map(format_change).collect())
}

fn split_pair(field: &str, pair: &Value) -> Result<(FieldValue, FieldValue)> {
  match pair.as_array() {
    Some(values) if values.len() == 2 => {
      Ok((FieldValue::from(&values[0]), FieldValue::from(&values[1])))
    }
    _ => Err(Error::MalformedDiffEntry(field.to_string())),
  }
}

/// Flatten both sides of a structured pair and join them by leaf path:
/// paths from the before side keep their order, paths present only on the
/// after side are appended in theirs. Unchanged leaves are dropped.
fn merge_flattened(
  field: &str,
  before: &FieldValue,
  after: &FieldValue,
) -> Vec<LeafChange> {
  let before_leaves = before.flatten(field);
  let after_leaves = after.flatten(field);

  let after_by_path: HashMap<&str, &FieldValue> = after_leaves
    .iter()
    .map(|(path, leaf)| (path.as_str(), leaf))
    .collect();
  let before_paths: HashSet<&str> =
    before_leaves.iter().map(|(path, _)| path.as_str()).collect();

  let mut changes = Vec::new();
  for (path, leaf) in &before_leaves {
    let counterpart = after_by_path.get(path.as_str()).copied();
    if counterpart != Some(leaf) {
      changes.push(LeafChange {
        path:   path.clone(),
        before: Some(leaf.clone()),
        after:  counterpart.cloned(),
      });
    }
  }
  for (path, leaf) in &after_leaves {
    if !before_paths.contains(path.as_str()) {
      changes.push(LeafChange {
        path:   path.clone(),
        before: None,
        after:  Some(leaf.clone()),
      });
    }
  }

  changes
}

// ─── Formatting ──────────────────────────────────────────────────────────────

fn format_change(change: &LeafChange) -> String {
  let label = match label_for(&change.path) {
    Some(label) => label.to_string(),
    None => format!("du champ {}", change.path),
  };
  format!(
    "Changement {label} de \"{}\" en \"{}\".",
    display_operand(change.before.as_ref()),
    display_operand(change.after.as_ref()),
  )
}

/// Default string form of an operand. Booleans render as checkbox states;
/// a missing side renders as `undefined`.
fn display_operand(value: Option<&FieldValue>) -> String {
  match value {
    None => "undefined".to_string(),
    Some(FieldValue::Scalar(Scalar::Bool(true))) => "coché".to_string(),
    Some(FieldValue::Scalar(Scalar::Bool(false))) => "décoché".to_string(),
    Some(FieldValue::Scalar(Scalar::Null)) => "null".to_string(),
    Some(FieldValue::Scalar(Scalar::Number(number))) => number.to_string(),
    Some(FieldValue::Scalar(Scalar::String(text))) => text.clone(),
    Some(structured) => structured.to_json().to_string(),
  }
}

// ─── Record diffing ──────────────────────────────────────────────────────────

/// Build the diff of two record snapshots: every top-level key whose value
/// differs maps to its `[before, after]` pair. A key missing on one side is
/// encoded as `null` on that side. Key order follows the before snapshot,
/// then after-only keys.
pub fn record_diff(before: &Value, after: &Value) -> Value {
  let empty = Map::new();
  let before_map = before.as_object().unwrap_or(&empty);
  let after_map = after.as_object().unwrap_or(&empty);

  let mut diff = Map::new();
  for (key, before_value) in before_map {
    let after_value = after_map.get(key).cloned().unwrap_or(Value::Null);
    if *before_value != after_value {
      diff.insert(
        key.clone(),
        Value::Array(vec![before_value.clone(), after_value]),
      );
    }
  }
  for (key, after_value) in after_map {
    if !before_map.contains_key(key) && !after_value.is_null() {
      diff.insert(
        key.clone(),
        Value::Array(vec![Value::Null, after_value.clone()]),
      );
    }
  }

  Value::Object(diff)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
