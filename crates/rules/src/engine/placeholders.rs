use docmerge_core::Tree;
use serde_json::Value;

/// Copy of `existing` with a `null` for every key `new` has and `existing`
/// lacks, recursing into mappings both sides have.
///
/// Expressions like `New.x == Existing.x` then see `none` on the stored side
/// instead of an undefined variable.
pub fn with_placeholders(existing: &Tree, new: &Tree) -> Tree {
    let mut prepared = existing.clone();
    fill(&mut prepared, new);
    prepared
}

fn fill(target: &mut Tree, reference: &Tree) {
    for (key, value) in reference {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), Value::Null);
            }
            Some(Value::Object(inner)) => {
                if let Value::Object(reference_inner) = value {
                    fill(inner, reference_inner);
                }
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> Tree {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn adds_null_for_keys_only_new_has() {
        let existing = tree(json!({"a": 1, "b": {"c": 2}}));
        let new = tree(json!({"a": 5, "b": {"c": 3, "d": 4}, "e": {"f": 1}}));
        let prepared = with_placeholders(&existing, &new);
        assert_eq!(
            prepared,
            tree(json!({"a": 1, "b": {"c": 2, "d": null}, "e": null}))
        );
    }

    #[test]
    fn keeps_existing_values_and_extra_keys() {
        let existing = tree(json!({"a": "x", "only": true, "b": 7}));
        let new = tree(json!({"b": {"nested": 1}}));
        let prepared = with_placeholders(&existing, &new);
        assert_eq!(prepared, existing, "a scalar is not widened into a mapping");
    }

    #[test]
    fn does_not_touch_the_input() {
        let existing = Tree::new();
        let new = tree(json!({"a": 1}));
        let _ = with_placeholders(&existing, &new);
        assert!(existing.is_empty());
    }
}
