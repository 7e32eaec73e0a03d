use docmerge_core::path::{self, PatchOutcome};
use docmerge_core::Tree;

use crate::diagnostics::{MergeEvent, MergeObserver};
use crate::expression::{ExpressionEvaluator, Variables};
use crate::schema::FieldMath;

/// Evaluate computed fields in declaration order and write each result.
///
/// Later expressions see earlier results through `Output`. A failed
/// evaluation leaves the field untouched and is reported to `observer`.
pub fn field_math(
    fields: &[FieldMath],
    new: &Tree,
    existing: &Tree,
    output: &mut Tree,
    evaluator: &dyn ExpressionEvaluator,
    observer: &dyn MergeObserver,
) -> usize {
    let mut changed = 0;
    for field in fields {
        let vars = Variables::computed(new, existing, &*output);
        match evaluator.evaluate(&field.expression, &vars) {
            Ok(value) => match path::patch(output, &field.output_field, value) {
                PatchOutcome::Rejected => observer.observe(&MergeEvent::ComputedFieldRejected {
                    expression: field.expression.clone(),
                    output_field: field.output_field.to_string(),
                }),
                _ => changed += 1,
            },
            Err(error) => observer.observe(&MergeEvent::ComputedFieldFailed {
                expression: field.expression.clone(),
                output_field: field.output_field.to_string(),
                error: error.to_string(),
            }),
        }
    }
    changed
}
