//! Group tree checks: expressions compile, path lists make sense.

use std::collections::HashSet;

use docmerge_core::FieldPath;

use super::ValidationResult;
use crate::expression::ExpressionEvaluator;
use crate::schema::Group;

pub(super) fn validate_groups(
    groups: &[Group],
    prefix: &str,
    evaluator: Option<&dyn ExpressionEvaluator>,
    result: &mut ValidationResult,
) {
    for (i, group) in groups.iter().enumerate() {
        let at = format!("{prefix}[{i}]");
        validate_group(group, &at, evaluator, result);
        validate_groups(&group.groups, &format!("{at}.groups"), evaluator, result);
    }
}

fn validate_group(
    group: &Group,
    at: &str,
    evaluator: Option<&dyn ExpressionEvaluator>,
    result: &mut ValidationResult,
) {
    if group.operation_count() == 0 && group.groups.is_empty() {
        result.warn(at, "group has no operations and no nested groups");
    }

    if let (Some(condition), Some(evaluator)) = (group.guard(), evaluator) {
        if let Err(e) = evaluator.check(condition) {
            result.error(format!("{at}.condition"), e.to_string());
        }
    }

    for (i, field) in group.field_math.iter().enumerate() {
        let field_at = format!("{at}.fieldMath[{i}]");
        if field.expression.trim().is_empty() {
            result.error(format!("{field_at}.expression"), "expression must not be empty");
            continue;
        }
        if let Some(evaluator) = evaluator {
            if let Err(e) = evaluator.check(&field.expression) {
                result.error(format!("{field_at}.expression"), e.to_string());
            }
        }
    }

    for (name, paths) in group.path_operations() {
        warn_duplicates(paths, &format!("{at}.{name}"), result);
    }

    for path in &group.field_merge {
        if !path.is_top_level_key() {
            result.warn(
                format!("{at}.fieldMerge"),
                format!(
                    "'{path}' is used as a literal top-level key; fieldMerge does not navigate nested fields or indexes"
                ),
            );
        }
    }

    let force_updated: HashSet<&str> = group.field_force_update.iter().map(FieldPath::as_str).collect();
    for path in &group.field_replace {
        if force_updated.contains(path.as_str()) {
            result.warn(
                format!("{at}.fieldReplace"),
                format!("'{path}' is also in fieldForceUpdate, which runs later and always wins"),
            );
        }
    }
}

fn warn_duplicates(paths: &[FieldPath], at: &str, result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for path in paths {
        if !seen.insert(path.as_str()) {
            result.warn(at, format!("duplicate path '{path}'"));
        }
    }
}
