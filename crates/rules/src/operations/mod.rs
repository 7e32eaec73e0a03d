//! Field-level merge strategies.
//!
//! Each applier takes the enricher tree (source of candidate values), the
//! output tree (mutated in place) and the group's path list for that
//! operation, and returns how many fields it changed. A group runs them in
//! this order:
//!
//! 1. [`field_math`] – computed fields
//! 2. [`replace_if_missing`]
//! 3. [`replace`]
//! 4. [`keep_latest`]
//! 5. [`keep_earliest`]
//! 6. [`merge_values`] – shallow set union
//! 7. [`force_update`]
//!
//! Field access looks at a literal top-level key equal to the path text first
//! (flattened documents carry keys like `"address.city"`), then walks the path.

mod keep;
mod math;
mod replace;
mod union;


use docmerge_core::path::{self, PatchOutcome};
use docmerge_core::{FieldPath, Tree};
use serde_json::Value;

pub use keep::{keep_earliest, keep_latest};
pub use math::field_math;
pub use replace::{force_update, replace, replace_if_missing};
pub use union::merge_values;

/// Scalar or sequence value at `path`; a mapping counts as absent.
pub(crate) fn leaf_value<'t>(tree: &'t Tree, path: &FieldPath) -> Option<&'t Value> {
    if !path.is_top_level_key() {
        if let Some(value) = tree.get(path.as_str()).filter(|v| !v.is_object()) {
            return Some(value);
        }
    }
    path::lookup_leaf(tree, path)
}

/// Any value at `path`, mappings included.
pub(crate) fn field_value<'t>(tree: &'t Tree, path: &FieldPath) -> Option<&'t Value> {
    if !path.is_top_level_key() {
        if let Some(value) = tree.get(path.as_str()) {
            return Some(value);
        }
    }
    path::lookup(tree, path)
}

/// Write `value` at `path`, preferring an existing literal key.
pub(crate) fn write_field(tree: &mut Tree, path: &FieldPath, value: Value) -> PatchOutcome {
    let outcome = match tree.get_mut(path.as_str()) {
        Some(slot) if !path.is_top_level_key() => {
            if slot.is_object() && !value.is_object() {
                PatchOutcome::Rejected
            } else {
                *slot = value;
                PatchOutcome::Replaced
            }
        }
        _ => path::patch(tree, path, value),
    };
    if outcome == PatchOutcome::Rejected {
        tracing::trace!(%path, "write rejected, target shape does not allow it");
    }
    outcome
}

/// Remove the value at `path`, preferring an existing literal key.
pub(crate) fn remove_field(tree: &mut Tree, path: &FieldPath) -> bool {
    if !path.is_top_level_key() && tree.remove(path.as_str()).is_some() {
        return true;
    }
    path::delete(tree, path)
}
