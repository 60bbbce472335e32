//! Keyed sequence merging.

use std::{collections::HashMap, hash::Hash};

/// Union of two sequences keyed by `key`, biased to the right: when both
/// sides carry the same key the right element wins wholesale (no
/// field-level merge), and every key keeps the position of its first
/// occurrence scanning left then right.
pub fn right_union_by<T, K, F>(left: &[T], right: &[T], key: F) -> Vec<T>
where
  T: Clone,
  K: Eq + Hash,
  F: Fn(&T) -> K,
{
  let mut merged: Vec<T> = Vec::with_capacity(left.len() + right.len());
  let mut positions: HashMap<K, usize> = HashMap::new();

  for item in left.iter().chain(right) {
    match positions.get(&key(item)) {
      Some(&position) => merged[position] = item.clone(),
      None => {
        positions.insert(key(item), merged.len());
        merged.push(item.clone());
      }
    }
  }

  merged
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Entry {
    id: &'static str,
    v:  u32,
  }

  #[test]
  fn right_side_wins_and_order_is_preserved() {
    let left = [Entry { id: "x", v: 1 }];
    let right = [Entry { id: "x", v: 2 }, Entry { id: "y", v: 3 }];

    let merged = right_union_by(&left, &right, |e| e.id);
    assert_eq!(
      merged,
      vec![Entry { id: "x", v: 2 }, Entry { id: "y", v: 3 }]
    );
  }

  #[test]
  fn disjoint_keys_concatenate() {
    let left = [Entry { id: "a", v: 1 }];
    let right = [Entry { id: "b", v: 2 }];
    let merged = right_union_by(&left, &right, |e| e.id);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].id, "a");
    assert_eq!(merged[1].id, "b");
  }

  #[test]
  fn empty_sides_are_fine() {
    let entries = [Entry { id: "a", v: 1 }];
    assert_eq!(right_union_by(&entries, &[], |e| e.id), entries.to_vec());
    assert_eq!(right_union_by(&[], &entries, |e| e.id), entries.to_vec());
    assert!(right_union_by::<Entry, _, _>(&[], &[], |e| e.id).is_empty());
  }
}
