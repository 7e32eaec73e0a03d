use docmerge_core::{is_empty_value, FieldPath, Tree};

use super::{field_value, leaf_value, remove_field, write_field};

/// Copy enricher values into fields the output does not have yet.
///
/// An existing output value is never overwritten, even `null` or `""`.
pub fn replace_if_missing(enricher: &Tree, output: &mut Tree, paths: &[FieldPath]) -> usize {
    let mut changed = 0;
    for path in paths {
        if leaf_value(output, path).is_some() {
            continue;
        }
        let Some(value) = leaf_value(enricher, path) else {
            continue;
        };
        if write_field(output, path, value.clone()).is_applied() {
            changed += 1;
        }
    }
    changed
}

/// Overwrite output fields with non-empty enricher values.
pub fn replace(enricher: &Tree, output: &mut Tree, paths: &[FieldPath]) -> usize {
    let mut changed = 0;
    for path in paths {
        let Some(value) = leaf_value(enricher, path).filter(|v| !is_empty_value(Some(*v))) else {
            continue;
        };
        if write_field(output, path, value.clone()).is_applied() {
            changed += 1;
        }
    }
    changed
}

/// Mirror the enricher: present values are written (mappings included), an
/// empty value deletes the output field. Absent enricher fields are skipped.
pub fn force_update(enricher: &Tree, output: &mut Tree, paths: &[FieldPath]) -> usize {
    let mut changed = 0;
    for path in paths {
        let applied = match field_value(enricher, path) {
            None => continue,
            Some(value) if is_empty_value(Some(value)) => remove_field(output, path),
            Some(value) => write_field(output, path, value.clone()).is_applied(),
        };
        if applied {
            changed += 1;
        }
    }
    changed
}
