//! Core [`RuleLoader`] struct: filesystem-backed merge rule loading with
//! optional hot-reload.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::expression::ExpressionEvaluator;
use crate::schema::MergeRule;

use super::error::{LoadResult, LoadStatus, Result};
use super::watcher::{handle_fs_event, is_rule_file, parse_rule, WatchState};

/// Shared rule map keyed by `metadata.id`.
pub type RuleMap = Arc<RwLock<HashMap<String, MergeRule>>>;

/// Filesystem-backed merge rule loader with optional hot-reload.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` files, parses and
/// validates them as [`MergeRule`]s, and keeps an in-memory map keyed by
/// rule id.
pub struct RuleLoader {
    /// Root directory containing rule YAML files.
    rules_dir: PathBuf,
    /// Rules and the file each was loaded from.
    state: WatchState,
    /// Compiles expressions during validation, if set.
    evaluator: Option<Arc<dyn ExpressionEvaluator>>,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl RuleLoader {
    /// Create a new loader for the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist.
    pub fn new(rules_dir: PathBuf) -> Self {
        if !rules_dir.exists() {
            if let Err(e) = fs::create_dir_all(&rules_dir) {
                warn!(path = %rules_dir.display(), error = %e, "failed to create rules directory");
            }
        }
        Self {
            rules_dir,
            state: WatchState::default(),
            evaluator: None,
            _watcher: None,
        }
    }

    /// Compile conditions and computed-field expressions with `evaluator`
    /// while loading, so broken expressions fail the file instead of being
    /// skipped at merge time.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn ExpressionEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Recursively scan the rules directory and load all YAML files.
    ///
    /// Dotfiles and non-YAML files are skipped. Parse and validation errors
    /// are reported per file and do not abort the scan.
    pub fn load_all(&self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        self.scan_dir_recursive(&self.rules_dir, &mut results)?;
        let loaded = results.iter().filter(|r| r.is_loaded()).count();
        let failed = results.iter().filter(|r| r.is_failed()).count();
        info!(path = %self.rules_dir.display(), loaded, failed, "scanned rules directory");
        Ok(results)
    }

    fn scan_dir_recursive(&self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        for entry in entries {
            let path = entry?.path();

            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with('.'));
            if hidden {
                if path.is_file() {
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Skipped {
                            reason: "dotfile".to_string(),
                        },
                    });
                }
                continue;
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            if !is_rule_file(&path) {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            match self.load_file(&path) {
                Ok(rule) => {
                    let rule_id = rule.id().to_string();
                    info!(
                        rule_id = %rule_id,
                        index_type = %rule.index_type,
                        path = %path.display(),
                        "loaded merge rule"
                    );
                    self.state.insert(path.clone(), rule);
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Loaded { rule_id },
                    });
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load rule file");
                    results.push(LoadResult {
                        path,
                        status: LoadStatus::Failed {
                            error: e.to_string(),
                        },
                    });
                }
            }
        }

        Ok(())
    }

    /// Parse and validate a single YAML file.
    ///
    /// Validation errors fail the load; warnings are logged.
    pub fn load_file(&self, path: &Path) -> Result<MergeRule> {
        let contents = fs::read_to_string(path)?;
        parse_rule(&contents, self.evaluator.as_deref())
    }

    /// Start a recursive filesystem watcher.
    ///
    /// On file create/modify the rule is re-parsed and upserted.
    /// On file delete the rule loaded from that file is removed.
    /// Invalid edits are logged as warnings; the previous version is kept.
    pub fn watch(&mut self) -> Result<()> {
        let state = self.state.clone();
        let evaluator = self.evaluator.clone();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &state, evaluator.as_deref()),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&self.rules_dir, RecursiveMode::Recursive)?;

        let _ = watcher
            .configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.rules_dir.display(), "watching rules directory for changes (recursive)");
        self._watcher = Some(watcher);
        Ok(())
    }

    /// Get the rules directory path.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }

    /// Get the shared rule map. Hot reloads are visible through it.
    pub fn rules(&self) -> RuleMap {
        Arc::clone(&self.state.rules)
    }

    /// Clone of the rule with the given id.
    pub fn get(&self, id: &str) -> Option<MergeRule> {
        self.state.read_rules().get(id).cloned()
    }

    /// The enabled rule governing `index_type`.
    ///
    /// When several enabled rules target the same index type, the lowest id
    /// wins so the choice does not depend on load order.
    pub fn rule_for_index(&self, index_type: &str) -> Option<MergeRule> {
        let rules = self.state.read_rules();
        let mut candidates: Vec<&MergeRule> = rules
            .values()
            .filter(|rule| rule.metadata.enabled && rule.index_type == index_type)
            .collect();
        candidates.sort_by(|a, b| a.id().cmp(b.id()));
        if candidates.len() > 1 {
            warn!(
                index_type,
                chosen = %candidates[0].id(),
                count = candidates.len(),
                "several enabled merge rules target the same index type"
            );
        }
        candidates.first().map(|rule| (*rule).clone())
    }
}
