//! Order-preserving set union over lists of field values.

use serde_json::Value;
use std::collections::HashSet;
use std::hash::Hash;

/// Concatenate `lists` in order and keep only the first occurrence of each
/// distinct value.
///
/// Equality is exact: no case folding, no trimming.
pub fn union_unique<'a, T, I>(lists: I) -> Vec<T>
where
    T: Eq + Hash + Clone + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    let mut seen: HashSet<&T> = HashSet::new();
    let mut merged = Vec::new();
    for item in lists.into_iter().flatten() {
        if seen.insert(item) {
            merged.push(item.clone());
        }
    }
    merged
}

/// [`union_unique`] for opaque JSON records, compared by structural equality.
pub fn union_values<'a, I>(lists: I) -> Vec<Value>
where
    I: IntoIterator<Item = &'a [Value]>,
{
    let mut merged: Vec<Value> = Vec::new();
    for item in lists.into_iter().flatten() {
        if !merged.contains(item) {
            merged.push(item.clone());
        }
    }
    merged
}
