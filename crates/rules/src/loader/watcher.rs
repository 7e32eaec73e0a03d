//! Shared loader state and the notify event handler (hot-reload).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::expression::ExpressionEvaluator;
use crate::schema::MergeRule;
use crate::validation::validate_rule;

use super::core::RuleMap;
use super::error::{Result, RuleError};

/// Rules keyed by id, plus which file each id came from.
#[derive(Clone, Default)]
pub(super) struct WatchState {
    pub(super) rules: RuleMap,
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
}

impl WatchState {
    pub(super) fn read_rules(&self) -> RwLockReadGuard<'_, HashMap<String, MergeRule>> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Upsert `rule` as the content of `path`. If the file previously held a
    /// rule with another id, that rule is dropped.
    pub(super) fn insert(&self, path: PathBuf, rule: MergeRule) {
        let id = rule.id().to_string();
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        let mut rules = self.rules.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = files.insert(path.clone(), id.clone()) {
            if previous != id {
                rules.remove(&previous);
            }
        }
        if let Some(other) = files.iter().find(|(p, i)| **i == id && **p != path).map(|(p, _)| p.clone()) {
            warn!(
                rule_id = %id,
                path = %path.display(),
                shadowed = %other.display(),
                "rule id defined in more than one file, latest load wins"
            );
            files.remove(&other);
        }
        rules.insert(id, rule);
    }

    /// Remove whatever rule was loaded from `path`.
    fn remove_path(&self, path: &Path) -> Option<MergeRule> {
        let id = self
            .files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)?;
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}

/// YAML extension and not a dotfile (which covers editor swap files).
pub(super) fn is_rule_file(path: &Path) -> bool {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yml" || e == "yaml");
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with('.'));
    is_yaml && !hidden
}

/// Parse rule YAML and validate it. Warnings are logged, errors fail.
pub(super) fn parse_rule(
    contents: &str,
    evaluator: Option<&dyn ExpressionEvaluator>,
) -> Result<MergeRule> {
    let rule: MergeRule = serde_yaml::from_str(contents)?;

    let result = validate_rule(&rule, evaluator);
    for warning in &result.warnings {
        warn!(rule_id = %rule.id(), path = %warning.path, "{}", warning.message);
    }
    if !result.valid {
        return Err(RuleError::Validation(format!(
            "rule '{}' is invalid: {}",
            rule.id(),
            result.error_summary()
        )));
    }
    Ok(rule)
}

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(
    event: &Event,
    state: &WatchState,
    evaluator: Option<&dyn ExpressionEvaluator>,
) {
    for path in event.paths.iter().filter(|p| is_rule_file(p)) {
        match &event.kind {
            EventKind::Create(CreateKind::File)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Name(_)) => {
                if !path.exists() {
                    // Rename away from this path.
                    remove_rule_by_path(state, path);
                    continue;
                }
                let parsed = fs::read_to_string(path)
                    .map_err(RuleError::from)
                    .and_then(|contents| parse_rule(&contents, evaluator));
                match parsed {
                    Ok(rule) => {
                        info!(rule_id = %rule.id(), path = %path.display(), "hot-reloaded merge rule");
                        state.insert(path.clone(), rule);
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "failed to load rule during hot-reload, keeping previous version"
                        );
                    }
                }
            }
            EventKind::Remove(RemoveKind::File) => remove_rule_by_path(state, path),
            _ => {}
        }
    }
}

fn remove_rule_by_path(state: &WatchState, path: &Path) {
    if let Some(rule) = state.remove_path(path) {
        info!(rule_id = %rule.id(), path = %path.display(), "removed rule after file deletion");
    }
}
