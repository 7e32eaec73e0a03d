use docmerge_core::{FieldPath, Tree};
use serde_json::Value;

/// Shallow set union of top-level fields.
///
/// The path text is used as a literal top-level key. Scalars count as one
/// element, `null` or a missing output field as none. Output elements come
/// first, then new enricher elements, each kept once in first-seen order.
/// The result is always written as a sequence.
pub fn merge_values(enricher: &Tree, output: &mut Tree, paths: &[FieldPath]) -> usize {
    let mut changed = 0;
    for path in paths {
        let key = path.as_str();
        let Some(incoming) = enricher.get(key) else {
            continue;
        };

        let mut merged: Vec<Value> = Vec::new();
        for value in elements(output.get(key)).chain(elements(Some(incoming))) {
            if !merged.contains(value) {
                merged.push(value.clone());
            }
        }

        output.insert(key.to_string(), Value::Array(merged));
        changed += 1;
    }
    changed
}

fn elements(value: Option<&Value>) -> std::slice::Iter<'_, Value> {
    match value {
        None | Some(Value::Null) => <&[Value]>::default().iter(),
        Some(Value::Array(items)) => items.iter(),
        Some(other) => std::slice::from_ref(other).iter(),
    }
}
