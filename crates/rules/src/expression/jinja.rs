//! minijinja-backed [`ExpressionEvaluator`].
//!
//! Each distinct expression is wrapped in a one-statement template
//! (`{% set result = <expression> %}`) and served through the environment's
//! loader, so the environment's template store doubles as a thread-safe cache
//! of compiled expressions. Evaluation runs the template and reads `result`
//! back from the final state, keeping the value's type intact.

use minijinja::Environment;
use serde_json::Value;

use super::{ExpressionError, ExpressionEvaluator, Variables};

/// Name the wrapped template assigns the expression's value to.
const RESULT_VAR: &str = "result";

/// Evaluates Jinja expressions such as `New.b.c - Existing.b.c` or
/// `New.status == "active"`.
#[derive(Debug)]
pub struct JinjaEvaluator {
    env: Environment<'static>,
}

impl JinjaEvaluator {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // The template name is the expression itself.
        env.set_loader(|expression| Ok(Some(format!("{{% set {RESULT_VAR} = {expression} %}}"))));
        Self { env }
    }
}

impl Default for JinjaEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionEvaluator for JinjaEvaluator {
    fn evaluate(&self, expression: &str, vars: &Variables<'_>) -> Result<Value, ExpressionError> {
        let template = self
            .env
            .get_template(expression)
            .map_err(|e| ExpressionError::Syntax {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        let state = template
            .eval_to_state(vars)
            .map_err(|e| ExpressionError::Evaluation {
                expression: expression.to_string(),
                message: e.to_string(),
            })?;

        let value = state
            .lookup(RESULT_VAR)
            .filter(|v| !v.is_undefined())
            .ok_or_else(|| ExpressionError::Undefined {
                expression: expression.to_string(),
            })?;

        serde_json::to_value(&value).map_err(|e| ExpressionError::Conversion {
            expression: expression.to_string(),
            message: e.to_string(),
        })
    }

    /// Compiles the expression, which also primes the cache.
    fn check(&self, expression: &str) -> Result<(), ExpressionError> {
        self.env
            .get_template(expression)
            .map(|_| ())
            .map_err(|e| ExpressionError::Syntax {
                expression: expression.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmerge_core::Tree;
    use serde_json::json;

    fn tree(value: Value) -> Tree {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn arithmetic_over_nested_fields() {
        let evaluator = JinjaEvaluator::new();
        let new = tree(json!({"a": 10, "b": {"c": 100}}));
        let existing = tree(json!({"a": 4, "b": {"c": 30}}));
        let vars = Variables::guard(&new, &existing);
        assert_eq!(
            evaluator.evaluate("New.b.c - Existing.b.c", &vars).unwrap(),
            json!(70)
        );
        assert_eq!(evaluator.evaluate("New.a + Existing.a", &vars).unwrap(), json!(14));
    }

    #[test]
    fn comparisons_return_booleans() {
        let evaluator = JinjaEvaluator::new();
        let new = tree(json!({"status": "active"}));
        let existing = tree(json!({"status": null}));
        let vars = Variables::guard(&new, &existing);
        assert_eq!(
            evaluator.evaluate(r#"New.status == "active""#, &vars).unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluator.evaluate("Existing.status is none", &vars).unwrap(),
            json!(true)
        );
        assert_eq!(
            evaluator.evaluate("New.status == Existing.status", &vars).unwrap(),
            json!(false)
        );
    }

    #[test]
    fn output_is_visible_to_computed_fields() {
        let evaluator = JinjaEvaluator::new();
        let empty = Tree::new();
        let output = tree(json!({"qty": 3, "price": 5}));
        let vars = Variables::computed(&empty, &empty, &output);
        assert_eq!(
            evaluator.evaluate("Output.qty * Output.price", &vars).unwrap(),
            json!(15)
        );
    }

    #[test]
    fn mapping_results_are_preserved() {
        let evaluator = JinjaEvaluator::new();
        let new = tree(json!({"geo": {"lat": 1.5, "lon": 2.5}}));
        let empty = Tree::new();
        let vars = Variables::guard(&new, &empty);
        assert_eq!(
            evaluator.evaluate("New.geo", &vars).unwrap(),
            json!({"lat": 1.5, "lon": 2.5})
        );
    }

    #[test]
    fn undefined_result_is_an_error() {
        let evaluator = JinjaEvaluator::new();
        let empty = Tree::new();
        let vars = Variables::guard(&empty, &empty);
        assert!(matches!(
            evaluator.evaluate("New.missing", &vars),
            Err(ExpressionError::Undefined { .. })
        ));
    }

    #[test]
    fn missing_operands_fail_evaluation() {
        let evaluator = JinjaEvaluator::new();
        let new = tree(json!({"b": {"c": 1}}));
        let empty = Tree::new();
        let vars = Variables::guard(&new, &empty);
        assert!(evaluator.evaluate("New.b.c - Existing.b.c", &vars).is_err());
    }

    #[test]
    fn check_reports_syntax_errors() {
        let evaluator = JinjaEvaluator::new();
        assert!(evaluator.check("New.a + 1").is_ok());
        assert!(matches!(
            evaluator.check("New.a +"),
            Err(ExpressionError::Syntax { .. })
        ));
    }

    #[test]
    fn shared_across_threads() {
        let evaluator = std::sync::Arc::new(JinjaEvaluator::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let evaluator = evaluator.clone();
                std::thread::spawn(move || {
                    let new = tree(json!({"n": i}));
                    let empty = Tree::new();
                    let vars = Variables::guard(&new, &empty);
                    evaluator.evaluate("New.n * 2", &vars).unwrap()
                })
            })
            .collect();
        let results: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![json!(0), json!(2), json!(4), json!(6)]);
    }
}
