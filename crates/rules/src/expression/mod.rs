//! Expression evaluation for group guards and computed fields.
//!
//! The merge engine only depends on the [`ExpressionEvaluator`] trait, so the
//! embedding application decides which expression language backs it. The
//! crate ships [`JinjaEvaluator`], built on minijinja expressions.
//!
//! Expressions see three variables: `New` (incoming document tree),
//! `Existing` (stored document tree, with `null` placeholders for keys only
//! `New` has) and, for computed fields only, `Output` (the tree being merged).

mod jinja;

use docmerge_core::Tree;
use serde::Serialize;
use serde_json::Value;

pub use jinja::JinjaEvaluator;

/// Variable environment handed to the evaluator.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Variables<'a> {
    #[serde(rename = "New")]
    pub new: &'a Tree,
    #[serde(rename = "Existing")]
    pub existing: &'a Tree,
    #[serde(rename = "Output", skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a Tree>,
}

impl<'a> Variables<'a> {
    /// Variables for a group condition.
    pub fn guard(new: &'a Tree, existing: &'a Tree) -> Self {
        Self {
            new,
            existing,
            output: None,
        }
    }

    /// Variables for a computed field, including the in-progress output.
    pub fn computed(new: &'a Tree, existing: &'a Tree, output: &'a Tree) -> Self {
        Self {
            new,
            existing,
            output: Some(output),
        }
    }
}

/// Errors raised while compiling or evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    #[error("syntax error in '{expression}': {message}")]
    Syntax { expression: String, message: String },

    #[error("failed to evaluate '{expression}': {message}")]
    Evaluation { expression: String, message: String },

    #[error("'{expression}' evaluated to an undefined value")]
    Undefined { expression: String },

    #[error("result of '{expression}' is not representable as a document value: {message}")]
    Conversion { expression: String, message: String },
}

/// Evaluates expressions against a [`Variables`] environment.
///
/// Implementations are shared by every merge running in the process and must
/// tolerate concurrent calls.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluate `expression` and return its value as a document value.
    fn evaluate(&self, expression: &str, vars: &Variables<'_>) -> Result<Value, ExpressionError>;

    /// Check that `expression` compiles, without evaluating it.
    ///
    /// Called while loading rules. The default accepts everything.
    fn check(&self, _expression: &str) -> Result<(), ExpressionError> {
        Ok(())
    }
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, &Variables<'_>) -> Result<Value, ExpressionError> + Send + Sync,
{
    fn evaluate(&self, expression: &str, vars: &Variables<'_>) -> Result<Value, ExpressionError> {
        self(expression, vars)
    }
}
