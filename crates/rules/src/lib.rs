//! YAML-driven document merge rule engine.
//!
//! This crate provides:
//! - `MergeRule` YAML definitions with serde deserialization
//! - Field-level merge strategies (replace, keep latest/earliest, union,
//!   force update, computed fields) applied by guarded, nested groups
//! - A pluggable expression evaluator, with a minijinja-backed default
//! - Filesystem loader with validation and hot-reload via `notify` watcher

pub mod diagnostics;
pub mod engine;
pub mod evaluator;
pub mod expression;
pub mod loader;
pub mod operations;
pub mod schema;
pub mod validation;

pub use diagnostics::{MergeEvent, MergeObserver, RecordingObserver, TracingObserver};
pub use engine::MergeEngine;
pub use expression::{ExpressionError, ExpressionEvaluator, JinjaEvaluator, Variables};
pub use loader::{RuleError, RuleLoader};
pub use schema::{FieldMath, Group, MergeConfig, MergeRule};
