//! Merge rule validation with structured errors and suggestions.
//!
//! Checks the rule envelope (apiVersion, kind, id, indexType) and walks the
//! group tree: expressions must compile, path lists are checked for
//! duplicates and for combinations that do not do what they look like.
//! Returns a [`ValidationResult`] with errors (block loading) and warnings
//! (advisory).

mod group_checks;
mod rule_checks;


pub mod fuzzy;

use serde::{Deserialize, Serialize};

use crate::expression::{ExpressionEvaluator, JinjaEvaluator};
use crate::schema::{MergeRule, GROUP_FIELDS};

pub use rule_checks::SUPPORTED_API_VERSION;

/// Field names accepted anywhere in a rule file, for "did you mean" hints.
const KNOWN_FIELDS: &[&str] = &[
    "apiVersion",
    "kind",
    "metadata",
    "indexType",
    "merge",
    "id",
    "name",
    "description",
    "tags",
    "enabled",
    "existingAsMaster",
    "expression",
    "outputField",
];

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Location in the rule, e.g. `"merge.groups[1].fieldMath[0].expression"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// All errors joined into one line, suggestions included.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| match &e.suggestion {
                Some(s) => format!("{}: {} ({s})", e.path, e.message),
                None => format!("{}: {}", e.path, e.message),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`MergeRule`].
///
/// With an evaluator, conditions and computed-field expressions are compiled;
/// without one, expressions are not checked.
pub fn validate_rule(
    rule: &MergeRule,
    evaluator: Option<&dyn ExpressionEvaluator>,
) -> ValidationResult {
    let mut result = ValidationResult::new();
    rule_checks::validate_envelope(rule, &mut result);
    group_checks::validate_groups(&rule.merge.groups, "merge.groups", evaluator, &mut result);
    result
}

/// Parse raw YAML and validate it, compiling expressions with the default
/// [`JinjaEvaluator`]. Parse errors are reported as errors on the document root.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match serde_yaml::from_str::<MergeRule>(yaml) {
        Ok(rule) => validate_rule(&rule, Some(&JinjaEvaluator::new())),
        Err(e) => {
            let mut result = ValidationResult::new();
            let message = format!("YAML parse error: {e}");
            let suggestion = fuzzy::unknown_field_name(&message).and_then(|field| {
                let candidates: Vec<&str> = GROUP_FIELDS.iter().chain(KNOWN_FIELDS).copied().collect();
                fuzzy::fuzzy_match(field, &candidates)
            });
            match suggestion {
                Some(name) => {
                    result.error_with_suggestion("", message, format!("Did you mean '{name}'?"))
                }
                None => result.error("", message),
            }
            result
        }
    }
}
