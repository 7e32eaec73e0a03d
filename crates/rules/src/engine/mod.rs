//! Merge orchestration: pick master and enricher, prepare the expression
//! environment, and run a [`MergeConfig`]'s groups against the master tree.
//!
//! [`MergeEngine::apply`] is total. Rule problems encountered mid-merge
//! (failing guards, failing computed fields, writes that would collapse a
//! mapping) degrade to no-ops and are reported to the engine's
//! [`MergeObserver`], never returned to the caller.

mod placeholders;


use std::sync::Arc;

use docmerge_core::Document;

use crate::diagnostics::{MergeObserver, TracingObserver};
use crate::evaluator::{GroupEvaluator, MergeScope};
use crate::expression::{ExpressionEvaluator, JinjaEvaluator};
use crate::schema::{MergeConfig, MergeRule};

pub use placeholders::with_placeholders;

/// Applies merge configurations to document pairs.
///
/// Cheap to clone and safe to share: every merge runs on its own trees, and
/// the evaluator and observer are shared read-mostly services.
#[derive(Clone)]
pub struct MergeEngine {
    evaluator: Arc<dyn ExpressionEvaluator>,
    observer: Arc<dyn MergeObserver>,
}

impl MergeEngine {
    /// Engine backed by `evaluator`, reporting events through `tracing`.
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        Self {
            evaluator,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the observer that receives tolerated failures.
    pub fn with_observer(mut self, observer: Arc<dyn MergeObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The evaluator this engine runs guards and computed fields with.
    pub fn evaluator(&self) -> &Arc<dyn ExpressionEvaluator> {
        &self.evaluator
    }

    /// Merge `new_doc` into `existing_doc` according to `config`.
    ///
    /// Without a stored document the incoming one is returned unchanged.
    /// Otherwise the master (stored document if `existing_as_master`, else
    /// the incoming one) is returned with its tree merged; its `source` is
    /// always set afterwards.
    pub fn apply(
        &self,
        config: &MergeConfig,
        new_doc: Document,
        existing_doc: Option<Document>,
    ) -> Document {
        let Some(mut existing_doc) = existing_doc else {
            tracing::trace!(id = %new_doc.id, "no stored document, keeping incoming as is");
            return new_doc;
        };
        let mut new_doc = new_doc;

        let _span = tracing::debug_span!(
            "merge",
            id = %new_doc.id,
            index_type = %new_doc.index_type,
            existing_as_master = config.existing_as_master,
        )
        .entered();

        let new_tree = new_doc.source.take().unwrap_or_default();
        let existing_tree = existing_doc.source.take().unwrap_or_default();
        let prepared = with_placeholders(&existing_tree, &new_tree);
        let groups = GroupEvaluator::new(self.evaluator.as_ref(), self.observer.as_ref());

        if config.existing_as_master {
            let mut output = existing_tree;
            let scope = MergeScope {
                new: &new_tree,
                existing: &prepared,
                enricher: &new_tree,
            };
            groups.apply_all(&config.groups, &scope, &mut output);
            existing_doc.source = Some(output);
            existing_doc
        } else {
            // `New` must stay the incoming tree as received while the output
            // (a copy of it) is mutated.
            let mut output = new_tree.clone();
            let scope = MergeScope {
                new: &new_tree,
                existing: &prepared,
                enricher: &existing_tree,
            };
            groups.apply_all(&config.groups, &scope, &mut output);
            new_doc.source = Some(output);
            new_doc
        }
    }

    /// [`apply`](Self::apply) with a loaded rule. A disabled rule leaves the
    /// documents untouched and returns the incoming one.
    pub fn apply_rule(
        &self,
        rule: &MergeRule,
        new_doc: Document,
        existing_doc: Option<Document>,
    ) -> Document {
        if !rule.metadata.enabled {
            tracing::debug!(rule_id = %rule.id(), "rule disabled, skipping merge");
            return new_doc;
        }
        tracing::debug!(rule_id = %rule.id(), id = %new_doc.id, "applying merge rule");
        self.apply(&rule.merge, new_doc, existing_doc)
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new(Arc::new(JinjaEvaluator::new()))
    }
}

impl std::fmt::Debug for MergeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeEngine").finish_non_exhaustive()
    }
}
