use serde_json::Value;

use super::MergeScope;
use crate::diagnostics::{MergeEvent, MergeObserver};
use crate::expression::{ExpressionEvaluator, Variables};

/// True only when `condition` evaluates to boolean `true`.
///
/// Truthy non-booleans (`1`, `"yes"`) do not pass. Guards see `New` and
/// `Existing` only.
pub(super) fn check_guard(
    condition: &str,
    scope: &MergeScope<'_>,
    evaluator: &dyn ExpressionEvaluator,
    observer: &dyn MergeObserver,
) -> bool {
    match evaluator.evaluate(condition, &Variables::guard(scope.new, scope.existing)) {
        Ok(Value::Bool(true)) => true,
        Ok(other) => {
            observer.observe(&MergeEvent::GuardRejected {
                condition: condition.to_string(),
                result: other.to_string(),
            });
            false
        }
        Err(error) => {
            observer.observe(&MergeEvent::GuardFailed {
                condition: condition.to_string(),
                error: error.to_string(),
            });
            false
        }
    }
}
