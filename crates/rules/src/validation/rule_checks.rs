//! Envelope checks: apiVersion, kind, metadata and index type.

use super::fuzzy::is_kebab_case;
use super::ValidationResult;
use crate::schema::{MergeRule, MERGE_RULE_KIND};

pub const SUPPORTED_API_VERSION: &str = "v1";

pub(super) fn validate_envelope(rule: &MergeRule, result: &mut ValidationResult) {
    if rule.api_version != SUPPORTED_API_VERSION {
        result.error(
            "apiVersion",
            format!(
                "unsupported apiVersion '{}', expected '{SUPPORTED_API_VERSION}'",
                rule.api_version
            ),
        );
    }

    if rule.kind != MERGE_RULE_KIND {
        result.error_with_suggestion(
            "kind",
            format!("unsupported kind '{}'", rule.kind),
            format!("Did you mean '{MERGE_RULE_KIND}'?"),
        );
    }

    let id = &rule.metadata.id;
    if id.is_empty() {
        result.error("metadata.id", "rule id must not be empty");
    } else if !is_kebab_case(id) {
        result.error_with_suggestion(
            "metadata.id",
            format!("rule id '{id}' is not kebab-case"),
            format!("Did you mean '{}'?", to_kebab_case(id)),
        );
    }

    if rule.metadata.name.trim().is_empty() {
        result.warn("metadata.name", "rule name is empty");
    }

    if rule.index_type.trim().is_empty() {
        result.error("indexType", "indexType must not be empty");
    }

    if rule.merge.groups.is_empty() {
        result.warn("merge.groups", "rule has no groups and will leave the master unchanged");
    }
}

fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for ch in s.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_suggestions() {
        assert_eq!(to_kebab_case("CustomerProfile"), "customer-profile");
        assert_eq!(to_kebab_case("orders_merge"), "orders-merge");
        assert_eq!(to_kebab_case("a  b"), "a-b");
    }
}
