//! Group tree evaluator.
//!
//! Walks a rule's groups depth-first. For each group the guard is checked
//! first; a group whose guard does not hold is skipped together with all of
//! its nested groups. Otherwise the group's operations run in fixed order
//! (see [`crate::operations`]) and its nested groups follow in declaration
//! order against the same output tree.

mod guard;


use docmerge_core::Tree;

use crate::diagnostics::MergeObserver;
use crate::expression::ExpressionEvaluator;
use crate::operations;
use crate::schema::Group;

use guard::check_guard;

// ── Merge scope ─────────────────────────────────────────────────────

/// The read-only trees one merge works from.
#[derive(Debug, Clone, Copy)]
pub struct MergeScope<'a> {
    /// Incoming document tree, as received.
    pub new: &'a Tree,
    /// Stored document tree, with `null` placeholders for keys only `new` has.
    pub existing: &'a Tree,
    /// The non-master tree: where candidate values are read from.
    pub enricher: &'a Tree,
}

// ── Group evaluator ─────────────────────────────────────────────────

/// Applies [`Group`] trees to an output tree.
pub struct GroupEvaluator<'e> {
    evaluator: &'e dyn ExpressionEvaluator,
    observer: &'e dyn MergeObserver,
}

impl<'e> GroupEvaluator<'e> {
    pub fn new(evaluator: &'e dyn ExpressionEvaluator, observer: &'e dyn MergeObserver) -> Self {
        Self {
            evaluator,
            observer,
        }
    }

    /// Apply top-level groups in order.
    pub fn apply_all(&self, groups: &[Group], scope: &MergeScope<'_>, output: &mut Tree) {
        for group in groups {
            self.apply_group(group, scope, output);
        }
    }

    /// Apply one group and, if its guard holds, its nested groups.
    pub fn apply_group(&self, group: &Group, scope: &MergeScope<'_>, output: &mut Tree) {
        if let Some(condition) = group.guard() {
            if !check_guard(condition, scope, self.evaluator, self.observer) {
                return;
            }
        }

        let changed = self.apply_operations(group, scope, output);
        tracing::trace!(changed, nested = group.groups.len(), "group applied");

        self.apply_all(&group.groups, scope, output);
    }

    fn apply_operations(&self, group: &Group, scope: &MergeScope<'_>, output: &mut Tree) -> usize {
        let enricher = scope.enricher;
        let mut changed = operations::field_math(
            &group.field_math,
            scope.new,
            scope.existing,
            output,
            self.evaluator,
            self.observer,
        );
        changed += operations::replace_if_missing(enricher, output, &group.field_replace_if_missing);
        changed += operations::replace(enricher, output, &group.field_replace);
        changed += operations::keep_latest(enricher, output, &group.field_keep_latest);
        changed += operations::keep_earliest(enricher, output, &group.field_keep_earliest);
        changed += operations::merge_values(enricher, output, &group.field_merge);
        changed += operations::force_update(enricher, output, &group.field_force_update);
        changed
    }
}
