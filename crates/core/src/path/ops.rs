//! Lookup, patch and delete over a [`Tree`] addressed by a [`FieldPath`].

use serde_json::Value;

use super::{FieldPath, PathSegment};
use crate::document::Tree;

/// Result of [`patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The leaf existed and was overwritten in place.
    Replaced,
    /// The leaf (and possibly intermediate mappings) was newly materialized.
    Created,
    /// The write would break the tree's shape and was not performed.
    Rejected,
}

impl PatchOutcome {
    /// True when the value was written, whether created or replaced.
    pub fn is_applied(self) -> bool {
        !matches!(self, PatchOutcome::Rejected)
    }

    /// True when an existing leaf was overwritten without creating anything.
    pub fn replaced_in_place(self) -> bool {
        matches!(self, PatchOutcome::Replaced)
    }
}

/// Value at `path`, including nested mappings. `None` on any miss.
pub fn lookup<'t>(tree: &'t Tree, path: &FieldPath) -> Option<&'t Value> {
    let (last, parents) = path.segments().split_last()?;
    let mut current = tree;
    for segment in parents {
        current = resolve(current, segment)?.as_object()?;
    }
    resolve(current, last)
}

/// Like [`lookup`], but a mapping at the end of the path counts as not found.
///
/// Leaf-oriented merge operations use this so they never pick up or clobber a
/// whole subtree.
pub fn lookup_leaf<'t>(tree: &'t Tree, path: &FieldPath) -> Option<&'t Value> {
    lookup(tree, path).filter(|value| !value.is_object())
}

/// Write `value` at `path`, creating missing intermediate mappings.
///
/// Array elements are never created: an indexed segment must address an
/// existing element. A mapping leaf may only be replaced by another mapping.
pub fn patch(tree: &mut Tree, path: &FieldPath, value: Value) -> PatchOutcome {
    let Some((last, parents)) = path.segments().split_last() else {
        return PatchOutcome::Rejected;
    };
    if !reachable(tree, path.segments()) {
        return PatchOutcome::Rejected;
    }

    let mut current = tree;
    for segment in parents {
        let next = match segment.index {
            None => current
                .entry(segment.key.clone())
                .or_insert_with(|| Value::Object(Tree::new())),
            Some(index) => match element_mut(current, &segment.key, index) {
                Some(element) => element,
                None => return PatchOutcome::Rejected,
            },
        };
        current = match next {
            Value::Object(map) => map,
            _ => return PatchOutcome::Rejected,
        };
    }

    if last.index.is_none() && !current.contains_key(&last.key) {
        current.insert(last.key.clone(), value);
        return PatchOutcome::Created;
    }
    let slot = match last.index {
        None => current.get_mut(&last.key),
        Some(index) => element_mut(current, &last.key, index),
    };
    let Some(slot) = slot else {
        return PatchOutcome::Rejected;
    };

    if slot.is_object() && !value.is_object() {
        return PatchOutcome::Rejected;
    }
    *slot = value;
    PatchOutcome::Replaced
}

/// Remove the leaf at `path`. An indexed final segment removes that element
/// and shifts the rest down.
pub fn delete(tree: &mut Tree, path: &FieldPath) -> bool {
    let Some((last, parents)) = path.segments().split_last() else {
        return false;
    };
    let mut current = tree;
    for segment in parents {
        let next = match segment.index {
            None => current.get_mut(&segment.key),
            Some(index) => element_mut(current, &segment.key, index),
        };
        current = match next.and_then(Value::as_object_mut) {
            Some(map) => map,
            None => return false,
        };
    }

    match last.index {
        None => current.remove(&last.key).is_some(),
        Some(index) => match current.get_mut(&last.key).and_then(Value::as_array_mut) {
            Some(items) if index < items.len() => {
                items.remove(index);
                true
            }
            _ => false,
        },
    }
}

fn resolve<'t>(map: &'t Tree, segment: &PathSegment) -> Option<&'t Value> {
    let value = map.get(&segment.key)?;
    match segment.index {
        None => Some(value),
        Some(index) => value.as_array()?.get(index),
    }
}

fn element_mut<'t>(map: &'t mut Tree, key: &str, index: usize) -> Option<&'t mut Value> {
    map.get_mut(key)?.as_array_mut()?.get_mut(index)
}

/// Read-only walk over the parent segments: true when `patch` can reach the
/// leaf's mapping, either through existing mappings or by creating plain keys.
///
/// Checked up front so a rejected write leaves no half-created mappings behind.
fn reachable(tree: &Tree, segments: &[PathSegment]) -> bool {
    let Some((_, parents)) = segments.split_last() else {
        return false;
    };
    let mut current = tree;
    for (position, segment) in parents.iter().enumerate() {
        match resolve(current, segment) {
            Some(Value::Object(map)) => current = map,
            Some(_) => return false,
            None => {
                // Missing from here on: only plain keys can be materialized.
                return segment.index.is_none()
                    && segments[position + 1..].iter().all(|s| s.index.is_none());
            }
        }
    }
    true
}
